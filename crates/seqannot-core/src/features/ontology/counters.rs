//! Denormalized term usage counters
//!
//! The single mutation point for `seq_count` / `annotation_count`. Callers
//! (the annotation aggregator) invoke this inside the same transaction as
//! the `annotation_parents` row change the delta accounts for; the counters
//! are never updated independently.

use sqlx::PgConnection;

/// Apply a counter delta to one term, addressed by description.
pub(crate) async fn bump_term_counters(
    conn: &mut PgConnection,
    description: &str,
    delta_seq_count: i64,
    delta_annotation_count: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE ontology_terms
        SET seq_count = seq_count + $2,
            annotation_count = annotation_count + $3
        WHERE description = $1
        "#,
    )
    .bind(description)
    .bind(delta_seq_count)
    .bind(delta_annotation_count)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Adjust the `seq_count` contribution of one annotation's closure rows by
/// a per-row delta, leaving `annotation_count` untouched. Used when the
/// cached sequence count changes without the detail list changing.
pub(crate) async fn rebalance_annotation_seq_count(
    conn: &mut PgConnection,
    annotation_id: i64,
    delta: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE ontology_terms AS t
        SET seq_count = t.seq_count + x.hits * $2
        FROM (
            SELECT term_description, COUNT(*) AS hits
            FROM annotation_parents
            WHERE annotation_id = $1
            GROUP BY term_description
        ) AS x
        WHERE t.description = x.term_description
        "#,
    )
    .bind(annotation_id)
    .bind(delta)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Reverse every counter contribution recorded for one annotation, grouped
/// from its current `annotation_parents` rows. Each row accounts for one
/// `(seq_count, 1)` bump.
pub(crate) async fn unwind_annotation_counters(
    conn: &mut PgConnection,
    annotation_id: i64,
    seq_count: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE ontology_terms AS t
        SET seq_count = t.seq_count - x.hits * $2,
            annotation_count = t.annotation_count - x.hits
        FROM (
            SELECT term_description, COUNT(*) AS hits
            FROM annotation_parents
            WHERE annotation_id = $1
            GROUP BY term_description
        ) AS x
        WHERE t.description = x.term_description
        "#,
    )
    .bind(annotation_id)
    .bind(seq_count)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
