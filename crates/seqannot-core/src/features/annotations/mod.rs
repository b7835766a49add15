//! Annotation aggregation feature
//!
//! Curation events linking sets of resolved sequences to ontology
//! assertions. Writes maintain the denormalized `annotation_parents`
//! closure table and the per-term usage counters inside one transaction;
//! reads aggregate large query batches into a single deduplicated response.

pub mod commands;
pub(crate) mod details;
pub mod queries;

pub use commands::add::{AddAnnotationCommand, AddAnnotationError};
pub use commands::delete::{DeleteAnnotationCommand, DeleteAnnotationError};
pub use commands::update::{UpdateAnnotationCommand, UpdateAnnotationError};
pub use queries::get_fast::{GetFastAnnotationsError, GetFastAnnotationsQuery};
