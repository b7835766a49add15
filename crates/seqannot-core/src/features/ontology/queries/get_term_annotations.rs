//! Annotations-by-term query
//!
//! Single indexed lookup against the denormalized `annotation_parents`
//! table; no graph walk at read time. Any annotation whose closure covers
//! the term is returned, so querying an ancestor finds annotations made on
//! its descendants.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::annotations::details;
use crate::models::{Annotation, AnnotationRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTermAnnotationsQuery {
    pub term: String,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetTermAnnotationsError {
    #[error("Term cannot be empty")]
    TermRequired,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetTermAnnotationsError> for AppError {
    fn from(err: GetTermAnnotationsError) -> Self {
        match err {
            GetTermAnnotationsError::TermRequired => AppError::Validation(err.to_string()),
            GetTermAnnotationsError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<Vec<AnnotationRecord>, GetTermAnnotationsError>> for GetTermAnnotationsQuery {}

impl crate::cqrs::middleware::Query for GetTermAnnotationsQuery {}

#[tracing::instrument(skip(pool, query), fields(term = %query.term))]
pub async fn handle(
    pool: PgPool,
    query: GetTermAnnotationsQuery,
) -> Result<Vec<AnnotationRecord>, GetTermAnnotationsError> {
    let term = query.term.trim().to_lowercase();
    if term.is_empty() {
        return Err(GetTermAnnotationsError::TermRequired);
    }

    let mut conn = pool.acquire().await?;

    let annotations: Vec<Annotation> = sqlx::query_as(
        r#"
        SELECT DISTINCT a.id, a.experiment_id, a.user_id, a.annotation_type, a.method,
               a.agent_type, a.description, a.is_private, a.seq_count, a.created_at
        FROM annotations a
        JOIN annotation_parents p ON p.annotation_id = a.id
        WHERE p.term_description = $1
        ORDER BY a.id
        "#,
    )
    .bind(&term)
    .fetch_all(&mut *conn)
    .await?;

    let mut records = Vec::with_capacity(annotations.len());
    for annotation in annotations {
        if !annotation.visible_to(query.user_id) {
            continue;
        }
        let annotation_details = details::fetch_details(&mut conn, annotation.id).await?;
        records.push(AnnotationRecord {
            annotation,
            details: annotation_details,
        });
    }

    Ok(records)
}
