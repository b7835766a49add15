//! Detail derivation shared by the add and update commands
//!
//! For each asserted `(detail type, term)` pair: insert-or-get the term,
//! record the literal detail row, expand the term's ancestor closure, and
//! write one `annotation_parents` row per unique `(detail type, ancestor)`
//! while bumping that ancestor's usage counters. The inverse operation
//! unwinds the counters from the stored rows before deleting them.
//!
//! Everything here runs on the caller's transaction; nothing commits.

use std::collections::HashSet;

use seqannot_common::types::DetailType;
use sqlx::PgConnection;

use crate::features::ontology::{counters, terms, traversal};
use crate::models::AnnotationDetail;

/// Insert the detail rows and the derived closure for one annotation.
///
/// `seq_count` is the annotation's cached sequence count; every unique
/// `(detail type, ancestor)` pair bumps the ancestor's `seq_count` by it and
/// its `annotation_count` by one.
pub(crate) async fn derive_details(
    conn: &mut PgConnection,
    annotation_id: i64,
    details: &[(DetailType, String)],
    seq_count: i64,
) -> Result<(), sqlx::Error> {
    let mut expanded: HashSet<(DetailType, String)> = HashSet::new();

    for (detail_type, term) in details {
        let term_id = terms::upsert_term(conn, term).await?;

        sqlx::query(
            r#"
            INSERT INTO annotation_details (annotation_id, detail_type, term_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(annotation_id)
        .bind(detail_type.as_str())
        .bind(term_id)
        .execute(&mut *conn)
        .await?;

        // The term was just upserted, so the closure always resolves.
        let closure = traversal::ancestor_closure(conn, term)
            .await?
            .unwrap_or_else(|| vec![term.clone()]);
        for ancestor in closure {
            expanded.insert((*detail_type, ancestor));
        }
    }

    for (detail_type, ancestor) in &expanded {
        sqlx::query(
            r#"
            INSERT INTO annotation_parents (annotation_id, detail_type, term_description)
            VALUES ($1, $2, $3)
            ON CONFLICT (annotation_id, detail_type, term_description) DO NOTHING
            "#,
        )
        .bind(annotation_id)
        .bind(detail_type.as_str())
        .bind(ancestor)
        .execute(&mut *conn)
        .await?;

        counters::bump_term_counters(conn, ancestor, seq_count, 1).await?;
    }

    Ok(())
}

/// Remove an annotation's detail and closure rows, symmetrically
/// decrementing every counter they bumped.
pub(crate) async fn remove_details(
    conn: &mut PgConnection,
    annotation_id: i64,
    seq_count: i64,
) -> Result<(), sqlx::Error> {
    counters::unwind_annotation_counters(conn, annotation_id, seq_count).await?;

    sqlx::query("DELETE FROM annotation_parents WHERE annotation_id = $1")
        .bind(annotation_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM annotation_details WHERE annotation_id = $1")
        .bind(annotation_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Fetch an annotation's literal detail list, materialized as descriptions.
pub(crate) async fn fetch_details(
    conn: &mut PgConnection,
    annotation_id: i64,
) -> Result<Vec<AnnotationDetail>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT d.detail_type, t.description AS term
        FROM annotation_details d
        JOIN ontology_terms t ON t.id = d.term_id
        WHERE d.annotation_id = $1
        ORDER BY d.id
        "#,
    )
    .bind(annotation_id)
    .fetch_all(&mut *conn)
    .await
}
