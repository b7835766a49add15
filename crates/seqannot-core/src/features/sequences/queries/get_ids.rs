//! Batch sequence id resolution
//!
//! Batch form of `get_id`: one entry per input, `-1` per miss. The first
//! definitive error (validation or store failure) aborts the whole batch;
//! a plain miss does not.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::sequences::resolve;
use crate::features::shared::validation::{validate_sequences, SequenceValidationError};

/// Id returned for a read that resolves to no stored sequence
pub const MISS: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSequenceIdsQuery {
    pub sequences: Vec<String>,
    #[serde(rename = "primerId", skip_serializing_if = "Option::is_none")]
    pub primer_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetSequenceIdsError {
    #[error(transparent)]
    Validation(#[from] SequenceValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetSequenceIdsError> for AppError {
    fn from(err: GetSequenceIdsError) -> Self {
        match err {
            GetSequenceIdsError::Validation(e) => AppError::Validation(e.to_string()),
            GetSequenceIdsError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<Vec<i64>, GetSequenceIdsError>> for GetSequenceIdsQuery {}

impl crate::cqrs::middleware::Query for GetSequenceIdsQuery {}

#[tracing::instrument(skip(pool, query), fields(count = query.sequences.len()))]
pub async fn handle(
    pool: PgPool,
    query: GetSequenceIdsQuery,
) -> Result<Vec<i64>, GetSequenceIdsError> {
    let normalized = validate_sequences(&query.sequences)?;

    let mut conn = pool.acquire().await?;
    let mut ids = Vec::with_capacity(normalized.len());

    for sequence in &normalized {
        let id =
            resolve::find_matching_sequence(&mut conn, sequence, query.primer_id, false, false)
                .await?
                .unwrap_or(MISS);
        ids.push(id);
    }

    Ok(ids)
}
