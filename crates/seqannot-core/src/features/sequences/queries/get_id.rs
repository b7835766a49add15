//! Resolve one raw read to its stored sequence id

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::sequences::resolve;
use crate::features::shared::validation::{validate_sequences, SequenceValidationError};

/// Query resolving a single read to its stored id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSequenceIdQuery {
    pub sequence: String,
    /// Restrict candidates to one primer/region
    #[serde(rename = "primerId", skip_serializing_if = "Option::is_none")]
    pub primer_id: Option<i64>,
    /// Require the stored candidate to be at least as long as the query
    #[serde(rename = "requireFullLength", default)]
    pub require_full_length: bool,
    /// Require the stored candidate to be at most as long as the query
    #[serde(rename = "noLonger", default)]
    pub no_longer: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GetSequenceIdError {
    #[error(transparent)]
    Validation(#[from] SequenceValidationError),
    #[error("No stored sequence matches the query read")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetSequenceIdError> for AppError {
    fn from(err: GetSequenceIdError) -> Self {
        match err {
            GetSequenceIdError::Validation(e) => AppError::Validation(e.to_string()),
            GetSequenceIdError::NotFound => AppError::NotFound("sequence".to_string()),
            GetSequenceIdError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<i64, GetSequenceIdError>> for GetSequenceIdQuery {}

impl crate::cqrs::middleware::Query for GetSequenceIdQuery {}

#[tracing::instrument(skip(pool, query), fields(primer_id = ?query.primer_id))]
pub async fn handle(pool: PgPool, query: GetSequenceIdQuery) -> Result<i64, GetSequenceIdError> {
    let normalized = validate_sequences(std::slice::from_ref(&query.sequence))?;

    let mut conn = pool.acquire().await?;
    let id = resolve::find_matching_sequence(
        &mut conn,
        &normalized[0],
        query.primer_id,
        query.require_full_length,
        query.no_longer,
    )
    .await?
    .ok_or(GetSequenceIdError::NotFound)?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sequences::commands::add::{self, AddSequencesCommand};
    use crate::features::shared::test_helpers::{test_read, TestPrimer};

    async fn seed(pool: &PgPool, reads: Vec<String>) -> Vec<i64> {
        TestPrimer::new("v4").insert(pool).await.unwrap();
        add::handle(
            pool.clone(),
            AddSequencesCommand {
                sequences: reads,
                taxonomies: None,
                external_ids: None,
                primer: "v4".to_string(),
            },
        )
        .await
        .unwrap()
    }

    fn query(sequence: String) -> GetSequenceIdQuery {
        GetSequenceIdQuery {
            sequence,
            primer_id: None,
            require_full_length: false,
            no_longer: false,
        }
    }

    #[sqlx::test]
    async fn test_round_trip(pool: PgPool) -> sqlx::Result<()> {
        let read = test_read(1, 150);
        let ids = seed(&pool, vec![read.clone()]).await;

        let resolved = handle(pool.clone(), query(read)).await.unwrap();
        assert_eq!(resolved, ids[0]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_longer_query_matches_stored_prefix(pool: PgPool) -> sqlx::Result<()> {
        let stored = test_read(2, 100);
        let ids = seed(&pool, vec![stored.clone()]).await;

        // 200bp read whose first 100 characters equal the stored sequence
        let longer = format!("{}{}", stored, test_read(3, 100));
        let resolved = handle(pool.clone(), query(longer)).await.unwrap();
        assert_eq!(resolved, ids[0]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_require_full_length_rejects_shorter_candidate(pool: PgPool) -> sqlx::Result<()> {
        let stored = test_read(4, 120);
        seed(&pool, vec![stored.clone()]).await;

        let longer = format!("{}{}", stored, test_read(5, 100));
        let mut q = query(longer);
        q.require_full_length = true;

        let result = handle(pool.clone(), q).await;
        assert!(matches!(result, Err(GetSequenceIdError::NotFound)));
        Ok(())
    }

    #[sqlx::test]
    async fn test_no_longer_rejects_longer_candidate(pool: PgPool) -> sqlx::Result<()> {
        let stored = test_read(9, 200);
        let ids = seed(&pool, vec![stored.clone()]).await;

        // 120bp read that is a prefix of the stored 200bp sequence
        let shorter: String = stored.chars().take(120).collect();

        let resolved = handle(pool.clone(), query(shorter.clone())).await.unwrap();
        assert_eq!(resolved, ids[0]);

        let mut q = query(shorter);
        q.no_longer = true;
        let result = handle(pool.clone(), q).await;
        assert!(matches!(result, Err(GetSequenceIdError::NotFound)));
        Ok(())
    }

    #[sqlx::test]
    async fn test_miss_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        seed(&pool, vec![test_read(6, 150)]).await;

        let result = handle(pool.clone(), query(test_read(7, 150))).await;
        assert!(matches!(result, Err(GetSequenceIdError::NotFound)));
        Ok(())
    }

    #[sqlx::test]
    async fn test_primer_scoping(pool: PgPool) -> sqlx::Result<()> {
        let read = test_read(8, 150);
        seed(&pool, vec![read.clone()]).await;
        let other = TestPrimer::new("v3").insert(&pool).await?;

        let mut q = query(read);
        q.primer_id = Some(other.id);

        let result = handle(pool.clone(), q).await;
        assert!(matches!(result, Err(GetSequenceIdError::NotFound)));
        Ok(())
    }
}
