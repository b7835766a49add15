//! seqannot Common Library
//!
//! Shared types, utilities, and error handling for the seqannot project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all seqannot
//! workspace members:
//!
//! - **Error Handling**: The project-wide error kinds and result type
//! - **Logging**: Centralized `tracing` initialization
//! - **Types**: Shared domain vocabulary (sequence normalization, detail
//!   types, seed constants)
//!
//! # Example
//!
//! ```
//! use seqannot_common::types::{normalize_sequence, SEED_LEN};
//!
//! let read = normalize_sequence(" TACGGAGGATCC ");
//! assert_eq!(read, "tacggaggatcc");
//! assert_eq!(SEED_LEN, 100);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
