//! Shared validation utilities
//!
//! Input validation applied by command and query handlers before any store
//! access. "Too short" and malformed inputs are validation errors, distinct
//! from store failures.

use seqannot_common::types::{normalize_sequence, DetailType, InvalidDetailType, SEED_LEN};
use thiserror::Error;

/// Errors that can occur during sequence validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceValidationError {
    #[error("Sequence is required and cannot be empty")]
    Required,

    #[error("Sequence at position {position} is {length} characters; at least {min} are required")]
    TooShort {
        position: usize,
        length: usize,
        min: usize,
    },
}

/// Errors that can occur during detail-list validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetailValidationError {
    #[error("At least one (detail type, term) pair is required")]
    Empty,

    #[error("Detail term at position {position} cannot be empty")]
    EmptyTerm { position: usize },

    #[error(transparent)]
    InvalidType(#[from] InvalidDetailType),
}

/// Normalize a batch of raw reads and verify each carries a full seed prefix.
///
/// Returns the normalized sequences in input order.
pub fn validate_sequences(raw: &[String]) -> Result<Vec<String>, SequenceValidationError> {
    if raw.is_empty() {
        return Err(SequenceValidationError::Required);
    }

    let mut normalized = Vec::with_capacity(raw.len());
    for (position, sequence) in raw.iter().enumerate() {
        let sequence = normalize_sequence(sequence);
        if sequence.len() < SEED_LEN {
            return Err(SequenceValidationError::TooShort {
                position,
                length: sequence.len(),
                min: SEED_LEN,
            });
        }
        normalized.push(sequence);
    }

    Ok(normalized)
}

/// Parse and lowercase a raw `(detail type, term)` list.
pub fn validate_details(
    raw: &[(String, String)],
) -> Result<Vec<(DetailType, String)>, DetailValidationError> {
    if raw.is_empty() {
        return Err(DetailValidationError::Empty);
    }

    let mut details = Vec::with_capacity(raw.len());
    for (position, (detail_type, term)) in raw.iter().enumerate() {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(DetailValidationError::EmptyTerm { position });
        }
        details.push((detail_type.parse::<DetailType>()?, term));
    }

    Ok(details)
}
