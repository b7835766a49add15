//! Term row helpers: atomic insert-or-get and id resolution

use sqlx::PgConnection;

/// Insert-or-get a term row by (already lowercased) description.
///
/// Runs as one atomic upsert so concurrent callers racing on a brand-new
/// description converge on a single row.
pub(crate) async fn upsert_term(
    conn: &mut PgConnection,
    description: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO ontology_terms (description)
        VALUES ($1)
        ON CONFLICT (description)
        DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(description)
    .fetch_one(&mut *conn)
    .await
}

/// Insert-or-get a vocabulary row by (already lowercased) name.
pub(crate) async fn upsert_vocabulary(
    conn: &mut PgConnection,
    description: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO ontology_vocabularies (description)
        VALUES ($1)
        ON CONFLICT (description)
        DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(description)
    .fetch_one(&mut *conn)
    .await
}

/// Resolve a description to a canonical term id.
///
/// Falls back to the synonym table when the literal description lookup
/// misses; synonym ties resolve to the lowest canonical id.
pub(crate) async fn resolve_term_id(
    conn: &mut PgConnection,
    description: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let direct: Option<i64> = sqlx::query_scalar("SELECT id FROM ontology_terms WHERE description = $1")
        .bind(description)
        .fetch_optional(&mut *conn)
        .await?;

    if direct.is_some() {
        return Ok(direct);
    }

    sqlx::query_scalar(
        r#"
        SELECT term_id FROM ontology_synonyms
        WHERE synonym = $1
        ORDER BY term_id
        LIMIT 1
        "#,
    )
    .bind(description)
    .fetch_optional(&mut *conn)
    .await
}
