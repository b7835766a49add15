//! Ancestor closure query
//!
//! Returns the queried term itself plus every transitive parent description,
//! across all vocabularies.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::ontology::traversal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetParentsQuery {
    pub term: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetParentsError {
    #[error("Term '{0}' not found (no matching description or synonym)")]
    TermNotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetParentsError> for AppError {
    fn from(err: GetParentsError) -> Self {
        match err {
            GetParentsError::TermNotFound(term) => AppError::NotFound(format!("term '{}'", term)),
            GetParentsError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<Vec<String>, GetParentsError>> for GetParentsQuery {}

impl crate::cqrs::middleware::Query for GetParentsQuery {}

#[tracing::instrument(skip(pool, query), fields(term = %query.term))]
pub async fn handle(pool: PgPool, query: GetParentsQuery) -> Result<Vec<String>, GetParentsError> {
    let mut conn = pool.acquire().await?;

    traversal::ancestor_closure(&mut conn, &query.term)
        .await?
        .ok_or_else(|| GetParentsError::TermNotFound(query.term.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ontology::commands::add_term::{self, AddTermCommand};
    use std::collections::HashSet;

    async fn closure(pool: &PgPool, term: &str) -> Vec<String> {
        handle(
            pool.clone(),
            GetParentsQuery {
                term: term.to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn test_chain_closure(pool: PgPool) -> sqlx::Result<()> {
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("b").with_parent("c").with_vocabulary("v"),
        )
        .await
        .unwrap();
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("a").with_parent("b").with_vocabulary("v"),
        )
        .await
        .unwrap();

        let parents: HashSet<String> = closure(&pool, "a").await.into_iter().collect();
        let expected: HashSet<String> =
            ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parents, expected);
        Ok(())
    }

    #[sqlx::test]
    async fn test_query_term_included_and_root_excluded(pool: PgPool) -> sqlx::Result<()> {
        add_term::handle(pool.clone(), AddTermCommand::new("feces"))
            .await
            .unwrap();

        assert_eq!(closure(&pool, "Feces").await, vec!["feces".to_string()]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_synonym_fallback(pool: PgPool) -> sqlx::Result<()> {
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("feces")
                .with_parent("gut")
                .with_synonyms(&["stool"]),
        )
        .await
        .unwrap();

        // The synonym resolves to the canonical id; the result is seeded
        // with the query string itself.
        let parents = closure(&pool, "stool").await;
        assert_eq!(parents[0], "stool");
        assert!(parents.contains(&"gut".to_string()));
        Ok(())
    }

    #[sqlx::test]
    async fn test_unknown_term(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(
            pool.clone(),
            GetParentsQuery {
                term: "unmapped".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(GetParentsError::TermNotFound(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_cyclic_edges_terminate(pool: PgPool) -> sqlx::Result<()> {
        // A cycle across two vocabularies: a -> b in v1, b -> a in v2.
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("a").with_parent("b").with_vocabulary("v1"),
        )
        .await
        .unwrap();
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("b").with_parent("a").with_vocabulary("v2"),
        )
        .await
        .unwrap();

        let parents: HashSet<String> = closure(&pool, "a").await.into_iter().collect();
        let expected: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parents, expected);
        Ok(())
    }

    #[sqlx::test]
    async fn test_diamond_reports_shared_ancestor_once(pool: PgPool) -> sqlx::Result<()> {
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("left").with_parent("top").with_vocabulary("v"),
        )
        .await
        .unwrap();
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("right").with_parent("top").with_vocabulary("v"),
        )
        .await
        .unwrap();
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("bottom").with_parent("left").with_vocabulary("v"),
        )
        .await
        .unwrap();
        add_term::handle(
            pool.clone(),
            AddTermCommand::new("bottom").with_parent("right").with_vocabulary("v"),
        )
        .await
        .unwrap();

        let parents = closure(&pool, "bottom").await;
        let tops = parents.iter().filter(|p| p.as_str() == "top").count();
        assert_eq!(tops, 1);
        assert_eq!(parents.len(), 4);
        Ok(())
    }
}
