//! Add annotation command
//!
//! One transaction covering sequence resolution, the experiment visibility
//! check, the annotation row, detail derivation with counter bumps, and the
//! sequence links. Any failure rolls the whole curation event back.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::annotations::details;
use crate::features::sequences::resolve;
use crate::features::shared::validation::{
    validate_details, validate_sequences, DetailValidationError, SequenceValidationError,
};
use crate::models::Experiment;

/// Command recording one curation event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAnnotationCommand {
    pub sequences: Vec<String>,
    pub primer: String,
    #[serde(rename = "experimentId")]
    pub experiment_id: i64,
    #[serde(rename = "annotationType")]
    pub annotation_type: String,
    /// Raw `(detail type, term)` pairs as asserted by the curator
    pub details: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "agentType", skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    /// `None` marks an anonymous curation event
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum AddAnnotationError {
    #[error(transparent)]
    SequenceValidation(#[from] SequenceValidationError),
    #[error(transparent)]
    DetailValidation(#[from] DetailValidationError),
    #[error("Annotation type is required and cannot be empty")]
    AnnotationTypeRequired,
    #[error("Primer '{0}' not found")]
    PrimerNotFound(String),
    #[error("Experiment with id '{0}' not found")]
    ExperimentNotFound(i64),
    #[error("Experiment '{0}' is private and not owned by the caller")]
    ExperimentNotVisible(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AddAnnotationError> for AppError {
    fn from(err: AddAnnotationError) -> Self {
        match err {
            AddAnnotationError::SequenceValidation(_)
            | AddAnnotationError::DetailValidation(_)
            | AddAnnotationError::AnnotationTypeRequired => AppError::Validation(err.to_string()),
            AddAnnotationError::PrimerNotFound(_) | AddAnnotationError::ExperimentNotFound(_) => {
                AppError::NotFound(err.to_string())
            },
            AddAnnotationError::ExperimentNotVisible(_) => AppError::Unauthorized(err.to_string()),
            AddAnnotationError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<i64, AddAnnotationError>> for AddAnnotationCommand {}

impl crate::cqrs::middleware::Command for AddAnnotationCommand {}

#[tracing::instrument(
    skip(pool, command),
    fields(experiment_id = command.experiment_id, count = command.sequences.len())
)]
pub async fn handle(pool: PgPool, command: AddAnnotationCommand) -> Result<i64, AddAnnotationError> {
    let normalized = validate_sequences(&command.sequences)?;
    let details = validate_details(&command.details)?;
    if command.annotation_type.trim().is_empty() {
        return Err(AddAnnotationError::AnnotationTypeRequired);
    }

    let mut tx = pool.begin().await?;

    let primer_id = resolve::find_primer_id(&mut tx, &command.primer)
        .await?
        .ok_or_else(|| AddAnnotationError::PrimerNotFound(command.primer.clone()))?;

    let experiment: Option<Experiment> = sqlx::query_as(
        r#"
        SELECT id, description, user_id, is_private, created_at
        FROM experiments
        WHERE id = $1
        "#,
    )
    .bind(command.experiment_id)
    .fetch_optional(&mut *tx)
    .await?;
    let experiment =
        experiment.ok_or(AddAnnotationError::ExperimentNotFound(command.experiment_id))?;

    let visible = !experiment.is_private
        || (experiment.user_id.is_some() && experiment.user_id == command.user_id);
    if !visible {
        return Err(AddAnnotationError::ExperimentNotVisible(experiment.id));
    }

    let sequence_ids =
        resolve::resolve_or_insert(&mut tx, &normalized, primer_id, None, None).await?;

    let seq_count = sequence_ids.len() as i64;
    let annotation_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO annotations
            (experiment_id, user_id, annotation_type, method, agent_type, description,
             is_private, seq_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(command.experiment_id)
    .bind(command.user_id)
    .bind(command.annotation_type.trim().to_lowercase())
    .bind(&command.method)
    .bind(&command.agent_type)
    .bind(&command.description)
    .bind(command.is_private)
    .bind(seq_count as i32)
    .fetch_one(&mut *tx)
    .await?;

    details::derive_details(&mut tx, annotation_id, &details, seq_count).await?;

    for sequence_id in &sequence_ids {
        sqlx::query(
            r#"
            INSERT INTO sequence_annotations (sequence_id, annotation_id)
            VALUES ($1, $2)
            ON CONFLICT (sequence_id, annotation_id) DO NOTHING
            "#,
        )
        .bind(sequence_id)
        .bind(annotation_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(annotation_id, seq_count, "annotation created");

    Ok(annotation_id)
}
