//! Ancestor-closure traversal over the edge set

use std::collections::HashSet;

use seqannot_common::types::ONTOLOGY_ROOT;
use sqlx::PgConnection;

use crate::features::ontology::terms::resolve_term_id;

/// Compute the ancestor closure of a term: the (lowercased) query string
/// itself plus every transitive parent description reachable via edges of
/// any vocabulary.
///
/// Returns `None` when the description resolves to no term, directly or via
/// synonym. The walk keeps a visited-id set so cyclic or duplicated edge
/// sets terminate, and the root sentinel is neither reported nor expanded.
pub(crate) async fn ancestor_closure(
    conn: &mut PgConnection,
    term: &str,
) -> Result<Option<Vec<String>>, sqlx::Error> {
    let term = term.trim().to_lowercase();
    let Some(term_id) = resolve_term_id(conn, &term).await? else {
        return Ok(None);
    };

    let mut closure = vec![term];
    let mut visited = HashSet::from([term_id]);
    let mut worklist = vec![term_id];

    while let Some(id) = worklist.pop() {
        let parents: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT t.id, t.description
            FROM ontology_edges e
            JOIN ontology_terms t ON t.id = e.parent_id
            WHERE e.term_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        for (parent_id, description) in parents {
            if description == ONTOLOGY_ROOT {
                continue;
            }
            if visited.insert(parent_id) {
                closure.push(description);
                worklist.push(parent_id);
            }
        }
    }

    Ok(Some(closure))
}
