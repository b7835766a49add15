//! Shared fixtures for integration tests

use sqlx::PgPool;

/// Deterministic nucleotide read; distinct tags give reads with distinct
/// seed prefixes.
pub fn read(tag: u64, len: usize) -> String {
    const BASES: [char; 4] = ['a', 'c', 'g', 't'];
    let mut state = tag.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            BASES[(state >> 33) as usize % 4]
        })
        .collect()
}

pub async fn seed_primer(pool: &PgPool, name: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar("INSERT INTO primers (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn seed_experiment(pool: &PgPool, user_id: Option<i64>) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        r#"
        INSERT INTO experiments (description, user_id, is_private)
        VALUES ('integration fixture', $1, FALSE)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn term_counters(pool: &PgPool, description: &str) -> sqlx::Result<(i64, i64)> {
    sqlx::query_as("SELECT seq_count, annotation_count FROM ontology_terms WHERE description = $1")
        .bind(description)
        .fetch_one(pool)
        .await
}
