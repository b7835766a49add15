//! Shared domain vocabulary
//!
//! Types and constants that both the core components and external callers
//! (importers, transport layers) agree on: sequence normalization rules, the
//! seed prefix length, and the detail-type vocabulary used by annotations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the seed prefix used as the indexable lookup key for stored
/// sequences. Reads shorter than this cannot be resolved.
pub const SEED_LEN: usize = 100;

/// Sentinel description marking an ontology root. Edges pointing at it are
/// kept in the store but never traversed or reported.
pub const ONTOLOGY_ROOT: &str = "na";

/// Normalize a raw nucleotide read for storage and comparison.
///
/// Trims surrounding whitespace and lowercases. All matching in the core is
/// exact on the normalized form.
pub fn normalize_sequence(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Extract the fixed-length seed prefix of an already-normalized sequence.
///
/// Returns `None` when the sequence is shorter than [`SEED_LEN`].
pub fn seed_prefix(sequence: &str) -> Option<&str> {
    sequence.get(..SEED_LEN)
}

/// Role a term plays in an annotation assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailType {
    /// The sequence is higher in the described context
    High,
    /// The sequence is lower in the described context
    Low,
    /// The term applies to every linked sequence
    All,
}

/// Error for unrecognized detail-type strings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid detail type '{0}': expected one of high, low, all")]
pub struct InvalidDetailType(pub String);

impl DetailType {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailType::High => "high",
            DetailType::Low => "low",
            DetailType::All => "all",
        }
    }
}

impl std::str::FromStr for DetailType {
    type Err = InvalidDetailType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(DetailType::High),
            "low" => Ok(DetailType::Low),
            "all" => Ok(DetailType::All),
            other => Err(InvalidDetailType(other.to_string())),
        }
    }
}

impl std::fmt::Display for DetailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
