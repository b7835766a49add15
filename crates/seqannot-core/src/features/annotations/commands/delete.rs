//! Delete annotation command
//!
//! Removes the annotation row together with its detail rows, denormalized
//! parent closure rows and sequence links, restoring the ontology term
//! counters the annotation contributed to. Sequences themselves are never
//! deleted; they may be referenced by other annotations.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::annotations::details;
use crate::models::Annotation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAnnotationCommand {
    #[serde(rename = "annotationId")]
    pub annotation_id: i64,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAnnotationError {
    #[error("Annotation with id '{0}' not found")]
    NotFound(i64),
    #[error("Annotation '{0}' may only be deleted by its creating user")]
    NotOwner(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteAnnotationError> for AppError {
    fn from(err: DeleteAnnotationError) -> Self {
        match err {
            DeleteAnnotationError::NotFound(id) => {
                AppError::NotFound(format!("annotation '{}'", id))
            },
            DeleteAnnotationError::NotOwner(_) => AppError::Unauthorized(err.to_string()),
            DeleteAnnotationError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<(), DeleteAnnotationError>> for DeleteAnnotationCommand {}

impl crate::cqrs::middleware::Command for DeleteAnnotationCommand {}

#[tracing::instrument(skip(pool, command), fields(annotation_id = command.annotation_id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteAnnotationCommand,
) -> Result<(), DeleteAnnotationError> {
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
        annotation.ok_or(DeleteAnnotationError::NotFound(command.annotation_id))?;

    if !annotation.mutable_by(command.user_id) {
        return Err(DeleteAnnotationError::NotOwner(annotation.id));
    }

    details::remove_details(&mut tx, annotation.id, i64::from(annotation.seq_count)).await?;

    sqlx::query("DELETE FROM sequence_annotations WHERE annotation_id = $1")
        .bind(annotation.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM annotations WHERE id = $1")
        .bind(annotation.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(annotation_id = annotation.id, "annotation deleted");

    Ok(())
}
