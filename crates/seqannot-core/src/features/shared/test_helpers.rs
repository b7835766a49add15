//! Test helpers and fixtures for database tests
//!
//! Builders that insert the rows most tests need (primers, experiments)
//! without repeating SQL in every test.
//!
//! # Examples
//!
//! ```rust,ignore
//! use seqannot_core::features::shared::test_helpers::*;
//!
//! #[sqlx::test]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let primer = TestPrimer::new("v4").insert(&pool).await?;
//!     let experiment = TestExperiment::new().owned_by(1).insert(&pool).await?;
//!     // ... test logic ...
//!     Ok(())
//! }
//! ```

use sqlx::PgPool;

/// Builder for creating test primers
#[derive(Debug, Clone)]
pub struct TestPrimer {
    pub id: i64,
    pub name: String,
    pub forward_primer: Option<String>,
    pub reverse_primer: Option<String>,
}

impl TestPrimer {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            forward_primer: None,
            reverse_primer: None,
        }
    }

    pub fn with_pair(mut self, forward: &str, reverse: &str) -> Self {
        self.forward_primer = Some(forward.to_string());
        self.reverse_primer = Some(reverse.to_string());
        self
    }

    /// Insert the primer and capture its assigned id
    pub async fn insert(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO primers (name, forward_primer, reverse_primer)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&self.name)
        .bind(&self.forward_primer)
        .bind(&self.reverse_primer)
        .fetch_one(pool)
        .await?;

        self.id = id;
        Ok(self)
    }
}

/// Builder for creating test experiments
#[derive(Debug, Clone)]
pub struct TestExperiment {
    pub id: i64,
    pub description: Option<String>,
    pub user_id: Option<i64>,
    pub is_private: bool,
}

impl Default for TestExperiment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExperiment {
    pub fn new() -> Self {
        Self {
            id: 0,
            description: Some("test experiment".to_string()),
            user_id: None,
            is_private: false,
        }
    }

    pub fn owned_by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Insert the experiment and capture its assigned id
    pub async fn insert(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO experiments (description, user_id, is_private)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&self.description)
        .bind(self.user_id)
        .bind(self.is_private)
        .fetch_one(pool)
        .await?;

        self.id = id;
        Ok(self)
    }
}

/// Deterministic pseudo-random nucleotide read of the given length
pub fn test_read(tag: u64, len: usize) -> String {
    let alphabet = ['a', 'c', 'g', 't'];
    let mut state = tag.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            alphabet[(state >> 33) as usize % 4]
        })
        .collect()
}

/// Fetch the (seq_count, annotation_count) pair for a term description
pub async fn term_counters(pool: &PgPool, description: &str) -> sqlx::Result<(i64, i64)> {
    sqlx::query_as(
        "SELECT seq_count, annotation_count FROM ontology_terms WHERE description = $1",
    )
    .bind(description)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_is_deterministic() {
        assert_eq!(test_read(7, 150), test_read(7, 150));
        assert_ne!(test_read(7, 150), test_read(8, 150));
        assert_eq!(test_read(3, 150).len(), 150);
    }

    #[test]
    fn test_experiment_builder() {
        let experiment = TestExperiment::new().owned_by(5).private();
        assert_eq!(experiment.user_id, Some(5));
        assert!(experiment.is_private);
    }
}
