//! seqannot Core Library
//!
//! Curation core for scientific annotations attached to short genetic marker
//! sequences, organized against a shared controlled-vocabulary hierarchy.
//!
//! # Overview
//!
//! Three components built bottom-up on a shared PostgreSQL store:
//!
//! - **Sequence resolution** (`features::sequences`): maps raw nucleotide
//!   reads of arbitrary length to stable integer identities using a
//!   fixed-length seed prefix plus exact shared-prefix comparison.
//! - **Ontology graph** (`features::ontology`): multi-vocabulary term
//!   hierarchy with synonym aliasing, ancestor-closure traversal, and
//!   denormalized usage counters.
//! - **Annotation aggregation** (`features::annotations`): links resolved
//!   sequences to annotation records, expands detail terms through the
//!   ontology, and answers batched multi-sequence annotation queries with
//!   deduplicated work.
//!
//! # Architecture
//!
//! The crate follows a **CQRS (Command Query Responsibility Segregation)**
//! layout: every operation is a command (write) or query (read) module with
//! its own request type, error enum, and `handle` function taking the pool
//! explicitly. The composition root, [`cqrs::build_mediator`], wires all
//! handlers into one dispatcher for the (external) transport layer.
//!
//! Each operation acquires its own connection or transaction on entry; no
//! database handle is shared ambiently. Annotation mutations are fully
//! transactional: row writes and counter updates commit or roll back as a
//! unit.
//!
//! # Example
//!
//! ```no_run
//! use seqannot_core::{config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let _mediator = seqannot_core::cqrs::build_mediator(pool);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod models;

// Re-export commonly used types
pub use error::{AppError, AppResult};
