//! Crate-level error taxonomy
//!
//! Every operation handler carries its own `thiserror` enum; those enums
//! convert into [`AppError`] so a transport layer (out of scope here) can
//! map error kinds uniformly without matching on per-operation types:
//!
//! - `Validation` / `NotFound` -> 4xx with a message
//! - `Unauthorized` -> 401/403
//! - `Conflict` -> 409
//! - `Database` -> 5xx, never exposing the underlying store error

use thiserror::Error;

/// Result type alias for core operations
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error kinds
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// True when the error should be reported as the caller's fault (4xx)
    /// rather than a store failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_))
    }
}

impl From<AppError> for seqannot_common::CoreError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => seqannot_common::CoreError::Validation(msg),
            AppError::NotFound(msg) => seqannot_common::CoreError::NotFound(msg),
            AppError::Unauthorized(msg) => seqannot_common::CoreError::Unauthorized(msg),
            AppError::Conflict(msg) => seqannot_common::CoreError::Conflict(msg),
            AppError::Database(e) => seqannot_common::CoreError::Persistence(e.to_string()),
        }
    }
}
