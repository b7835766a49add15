//! Update annotation command
//!
//! Partial field replace. When a new detail list is supplied the old
//! closure rows are unwound (counters decremented symmetrically) and the
//! details re-derived exactly as on create, using the annotation's cached
//! sequence count unless a new one is supplied.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::annotations::details;
use crate::features::ontology::counters;
use crate::features::shared::validation::{validate_details, DetailValidationError};
use crate::models::Annotation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAnnotationCommand {
    #[serde(rename = "annotationId")]
    pub annotation_id: i64,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(rename = "annotationType", skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "agentType", skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    /// Full replacement detail list; `None` leaves details untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<(String, String)>>,
    /// Override for the cached sequence count used when re-deriving details
    #[serde(rename = "seqCount", skip_serializing_if = "Option::is_none")]
    pub seq_count: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateAnnotationError {
    #[error("Annotation with id '{0}' not found")]
    NotFound(i64),
    #[error("Annotation '{0}' may only be updated by its creating user")]
    NotOwner(i64),
    #[error(transparent)]
    DetailValidation(#[from] DetailValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateAnnotationError> for AppError {
    fn from(err: UpdateAnnotationError) -> Self {
        match err {
            UpdateAnnotationError::NotFound(id) => {
                AppError::NotFound(format!("annotation '{}'", id))
            },
            UpdateAnnotationError::NotOwner(_) => AppError::Unauthorized(err.to_string()),
            UpdateAnnotationError::DetailValidation(_) => AppError::Validation(err.to_string()),
            UpdateAnnotationError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<(), UpdateAnnotationError>> for UpdateAnnotationCommand {}

impl crate::cqrs::middleware::Command for UpdateAnnotationCommand {}

#[tracing::instrument(skip(pool, command), fields(annotation_id = command.annotation_id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateAnnotationCommand,
) -> Result<(), UpdateAnnotationError> {
    let details = command
        .details
        .as_deref()
        .map(validate_details)
        .transpose()?;

    let mut tx = pool.begin().await?;

    let annotation: Option<Annotation> = sqlx::query_as(
        r#"
        SELECT id, experiment_id, user_id, annotation_type, method, agent_type,
               description, is_private, seq_count, created_at
        FROM annotations
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(command.annotation_id)
    .fetch_optional(&mut *tx)
    .await?;
    let annotation =
        annotation.ok_or(UpdateAnnotationError::NotFound(command.annotation_id))?;

    if !annotation.mutable_by(command.user_id) {
        return Err(UpdateAnnotationError::NotOwner(annotation.id));
    }

    sqlx::query(
        r#"
        UPDATE annotations
        SET annotation_type = COALESCE($2, annotation_type),
            method = COALESCE($3, method),
            agent_type = COALESCE($4, agent_type),
            description = COALESCE($5, description),
            is_private = COALESCE($6, is_private),
            seq_count = COALESCE($7, seq_count)
        WHERE id = $1
        "#,
    )
    .bind(annotation.id)
    .bind(command.annotation_type.as_deref().map(str::to_lowercase))
    .bind(&command.method)
    .bind(&command.agent_type)
    .bind(&command.description)
    .bind(command.is_private)
    .bind(command.seq_count)
    .execute(&mut *tx)
    .await?;

    let old_count = i64::from(annotation.seq_count);
    let new_count = command.seq_count.map(i64::from).unwrap_or(old_count);

    if let Some(details) = details {
        details::remove_details(&mut tx, annotation.id, old_count).await?;
        details::derive_details(&mut tx, annotation.id, &details, new_count).await?;
    } else if new_count != old_count {
        // Cached count changed but the detail list did not: the existing
        // closure rows were bumped with the old count, so shift each term's
        // seq_count by the per-row delta to keep the counters symmetric
        // with a later unwind.
        counters::rebalance_annotation_seq_count(&mut tx, annotation.id, new_count - old_count)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(annotation_id = annotation.id, "annotation updated");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::annotations::commands::add;
    use crate::features::shared::test_helpers::{
        term_counters, test_read, TestExperiment, TestPrimer,
    };

    fn update(annotation_id: i64, user_id: Option<i64>) -> UpdateAnnotationCommand {
        UpdateAnnotationCommand {
            annotation_id,
            user_id,
            annotation_type: None,
            method: None,
            description: None,
            agent_type: None,
            is_private: None,
            details: None,
            seq_count: None,
        }
    }

    async fn seed_annotation(pool: &PgPool) -> i64 {
        TestPrimer::new("v4").insert(pool).await.unwrap();
        let experiment = TestExperiment::new().owned_by(1).insert(pool).await.unwrap();
        add::handle(
            pool.clone(),
            add::tests::command(
                experiment.id,
                vec![test_read(1, 150), test_read(2, 150)],
                vec![("high".to_string(), "feces".to_string())],
            ),
        )
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn test_only_owner_may_update(pool: PgPool) -> sqlx::Result<()> {
        let annotation_id = seed_annotation(&pool).await;

        let result = handle(pool.clone(), update(annotation_id, Some(2))).await;
        assert!(matches!(result, Err(UpdateAnnotationError::NotOwner(_))));

        assert!(handle(pool.clone(), update(annotation_id, Some(1)))
            .await
            .is_ok());
        Ok(())
    }

    #[sqlx::test]
    async fn test_scalar_fields_partially_replaced(pool: PgPool) -> sqlx::Result<()> {
        let annotation_id = seed_annotation(&pool).await;

        let mut cmd = update(annotation_id, Some(1));
        cmd.method = Some("qpcr".to_string());
        cmd.is_private = Some(true);
        handle(pool.clone(), cmd).await.unwrap();

        let (annotation_type, method, is_private): (String, Option<String>, bool) =
            sqlx::query_as(
                "SELECT annotation_type, method, is_private FROM annotations WHERE id = $1",
            )
            .bind(annotation_id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(annotation_type, "differential");
        assert_eq!(method.as_deref(), Some("qpcr"));
        assert!(is_private);
        Ok(())
    }

    #[sqlx::test]
    async fn test_detail_replacement_rebalances_counters(pool: PgPool) -> sqlx::Result<()> {
        let annotation_id = seed_annotation(&pool).await;
        assert_eq!(term_counters(&pool, "feces").await?, (2, 1));

        let mut cmd = update(annotation_id, Some(1));
        cmd.details = Some(vec![("low".to_string(), "saliva".to_string())]);
        handle(pool.clone(), cmd).await.unwrap();

        assert_eq!(term_counters(&pool, "feces").await?, (0, 0));
        assert_eq!(term_counters(&pool, "saliva").await?, (2, 1));
        Ok(())
    }

    #[sqlx::test]
    async fn test_seq_count_override_rebalances_counters(pool: PgPool) -> sqlx::Result<()> {
        use crate::features::annotations::commands::delete::{self, DeleteAnnotationCommand};

        let annotation_id = seed_annotation(&pool).await;
        assert_eq!(term_counters(&pool, "feces").await?, (2, 1));

        let mut cmd = update(annotation_id, Some(1));
        cmd.seq_count = Some(10);
        handle(pool.clone(), cmd).await.unwrap();

        assert_eq!(term_counters(&pool, "feces").await?, (10, 1));

        // A later delete unwinds with the new cached count; the counters
        // must land back at zero, not go negative.
        delete::handle(
            pool.clone(),
            DeleteAnnotationCommand {
                annotation_id,
                user_id: Some(1),
            },
        )
        .await
        .unwrap();

        assert_eq!(term_counters(&pool, "feces").await?, (0, 0));
        Ok(())
    }

    #[sqlx::test]
    async fn test_missing_annotation(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(pool.clone(), update(777, Some(1))).await;
        assert!(matches!(result, Err(UpdateAnnotationError::NotFound(777))));
        Ok(())
    }
}
