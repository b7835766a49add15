//! Shared utilities for feature modules
//!
//! # Contents
//!
//! - **validation**: Input validation utilities
//! - **test_helpers**: Test fixtures and utilities (test-only)

pub mod validation;

#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used types
pub use validation::{
    validate_details, validate_sequences, DetailValidationError, SequenceValidationError,
};
