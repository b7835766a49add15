//! Error types for seqannot

use thiserror::Error;

/// Result type alias for seqannot operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Project-wide error kinds.
///
/// Every component operation returns its own `thiserror` enum; those enums
/// convert into this type at the crate boundary so the (external) transport
/// layer can map kinds uniformly: `Validation`/`NotFound` to 4xx,
/// `Unauthorized` to 401/403, `Conflict` to 409, `Persistence` to 5xx.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Create a not found error with resource context
    pub fn not_found(resource_type: &str, identifier: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} '{}' not found", resource_type, identifier))
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a conflict error with resource context
    pub fn conflict(resource_type: &str, identifier: impl std::fmt::Display) -> Self {
        Self::Conflict(format!("{} '{}' already exists", resource_type, identifier))
    }
}
