//! Add sequences command
//!
//! Resolves a batch of raw reads to sequence ids, creating records for reads
//! never seen before. Already-stored prefix-compatible sequences are reused
//! rather than duplicated.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::sequences::resolve;
use crate::features::shared::validation::{validate_sequences, SequenceValidationError};

/// Command to add (or re-resolve) a batch of sequences
///
/// `taxonomies` and `external_ids`, when given, must align positionally with
/// `sequences`; they are stored on newly created rows only. Later enrichment
/// of existing rows belongs to the out-of-scope batch jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSequencesCommand {
    pub sequences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomies: Option<Vec<String>>,
    #[serde(rename = "externalIds", skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<Vec<i64>>,
    pub primer: String,
}

/// Errors that can occur when adding sequences
#[derive(Debug, thiserror::Error)]
pub enum AddSequencesError {
    /// A sequence failed validation (empty batch or read shorter than the
    /// seed length)
    #[error(transparent)]
    Validation(#[from] SequenceValidationError),
    /// An optional aligned list has the wrong length
    #[error("{0} list must align with sequences ({1} entries for {2} sequences)")]
    AlignmentMismatch(&'static str, usize, usize),
    /// The primer/region name is unknown
    #[error("Primer '{0}' not found")]
    PrimerNotFound(String),
    /// A database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AddSequencesError> for AppError {
    fn from(err: AddSequencesError) -> Self {
        match err {
            AddSequencesError::Validation(e) => AppError::Validation(e.to_string()),
            AddSequencesError::AlignmentMismatch(..) => AppError::Validation(err.to_string()),
            AddSequencesError::PrimerNotFound(name) => {
                AppError::NotFound(format!("primer '{}'", name))
            },
            AddSequencesError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<Vec<i64>, AddSequencesError>> for AddSequencesCommand {}

impl crate::cqrs::middleware::Command for AddSequencesCommand {}

impl AddSequencesCommand {
    /// Validate the command and return the normalized sequences
    pub fn validate(&self) -> Result<Vec<String>, AddSequencesError> {
        let normalized = validate_sequences(&self.sequences)?;

        if let Some(taxonomies) = &self.taxonomies {
            if taxonomies.len() != self.sequences.len() {
                return Err(AddSequencesError::AlignmentMismatch(
                    "taxonomies",
                    taxonomies.len(),
                    self.sequences.len(),
                ));
            }
        }
        if let Some(external_ids) = &self.external_ids {
            if external_ids.len() != self.sequences.len() {
                return Err(AddSequencesError::AlignmentMismatch(
                    "external ids",
                    external_ids.len(),
                    self.sequences.len(),
                ));
            }
        }

        Ok(normalized)
    }
}

#[tracing::instrument(skip(pool, command), fields(count = command.sequences.len(), primer = %command.primer))]
pub async fn handle(
    pool: PgPool,
    command: AddSequencesCommand,
) -> Result<Vec<i64>, AddSequencesError> {
    let normalized = command.validate()?;

    let mut tx = pool.begin().await?;

    let primer_id = resolve::find_primer_id(&mut *tx, &command.primer)
        .await?
        .ok_or_else(|| AddSequencesError::PrimerNotFound(command.primer.clone()))?;

    let ids = resolve::resolve_or_insert(
        &mut *tx,
        &normalized,
        primer_id,
        command.taxonomies.as_deref(),
        command.external_ids.as_deref(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(resolved = ids.len(), "sequences resolved");

    Ok(ids)
}
