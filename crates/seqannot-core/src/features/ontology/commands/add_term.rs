//! Add ontology term command
//!
//! Insert-or-get a term, its parent, and its vocabulary, then record the
//! parent edge and any synonym aliases. The whole operation is idempotent:
//! repeating it returns the same term id and duplicates nothing.

use mediator::Request;
use seqannot_common::types::ONTOLOGY_ROOT;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::ontology::terms;

fn default_parent() -> String {
    ONTOLOGY_ROOT.to_string()
}

fn default_vocabulary() -> String {
    "default".to_string()
}

/// Command to register an ontology term
///
/// All string inputs are lowercased. `parent` defaults to the root sentinel
/// and `vocabulary` to "default". Synonyms are stored as alias rows pointing
/// at the canonical id; a synonym equal to the term's own description is
/// allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTermCommand {
    pub term: String,
    #[serde(default = "default_parent")]
    pub parent: String,
    #[serde(rename = "vocabularyName", default = "default_vocabulary")]
    pub vocabulary: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl AddTermCommand {
    /// Register `term` under the root of the default vocabulary
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            parent: default_parent(),
            vocabulary: default_vocabulary(),
            synonyms: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = parent.to_string();
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: &str) -> Self {
        self.vocabulary = vocabulary.to_string();
        self
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn validate(&self) -> Result<(), AddTermError> {
        if self.term.trim().is_empty() {
            return Err(AddTermError::TermRequired);
        }
        if self.parent.trim().is_empty() {
            return Err(AddTermError::ParentRequired);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddTermError {
    #[error("Term is required and cannot be empty")]
    TermRequired,
    #[error("Parent is required and cannot be empty; omit it for a root term")]
    ParentRequired,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AddTermError> for AppError {
    fn from(err: AddTermError) -> Self {
        match err {
            AddTermError::TermRequired | AddTermError::ParentRequired => {
                AppError::Validation(err.to_string())
            },
            AddTermError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<i64, AddTermError>> for AddTermCommand {}

impl crate::cqrs::middleware::Command for AddTermCommand {}

#[tracing::instrument(skip(pool, command), fields(term = %command.term, vocabulary = %command.vocabulary))]
pub async fn handle(pool: PgPool, command: AddTermCommand) -> Result<i64, AddTermError> {
    command.validate()?;

    let term = command.term.trim().to_lowercase();
    let parent = command.parent.trim().to_lowercase();
    let vocabulary = command.vocabulary.trim().to_lowercase();

    let mut tx = pool.begin().await?;

    let term_id = terms::upsert_term(&mut tx, &term).await?;
    let parent_id = terms::upsert_term(&mut tx, &parent).await?;
    let vocabulary_id = terms::upsert_vocabulary(&mut tx, &vocabulary).await?;

    sqlx::query(
        r#"
        INSERT INTO ontology_edges (term_id, parent_id, vocabulary_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (term_id, parent_id, vocabulary_id) DO NOTHING
        "#,
    )
    .bind(term_id)
    .bind(parent_id)
    .bind(vocabulary_id)
    .execute(&mut *tx)
    .await?;

    for synonym in &command.synonyms {
        sqlx::query(
            r#"
            INSERT INTO ontology_synonyms (term_id, synonym)
            VALUES ($1, $2)
            ON CONFLICT (term_id, synonym) DO NOTHING
            "#,
        )
        .bind(term_id)
        .bind(synonym.trim().to_lowercase())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(term_id, "ontology term registered");

    Ok(term_id)
}
