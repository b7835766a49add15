//! Seed/prefix matching against stored sequences
//!
//! Shared by the add command, the id queries, and the annotation
//! aggregator (which resolves inside its own transaction). All helpers take
//! an explicit connection so callers decide the transactional scope.

use seqannot_common::types::seed_prefix;
use sqlx::{FromRow, PgConnection};

#[derive(Debug, FromRow)]
struct SeedCandidate {
    id: i64,
    sequence: String,
    length: i32,
}

/// Look up a primer/region id by its (lowercased) name.
pub(crate) async fn find_primer_id(
    conn: &mut PgConnection,
    name: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM primers WHERE name = $1")
        .bind(name.trim().to_lowercase())
        .fetch_optional(&mut *conn)
        .await
}

/// Find the stored sequence matching a normalized query read.
///
/// Fetches every stored sequence sharing the query's seed prefix
/// (optionally scoped to one primer/region), then accepts candidates whose
/// shared prefix of length `min(len(stored), len(query))` equals the query's.
/// With `require_full_length` the stored candidate must additionally be at
/// least as long as the query; with `no_longer` it must be at most as long.
///
/// Seed-collision tie-break, in order: exact length match, then longest
/// compared length, then lowest id. Candidates are fetched ordered by id so
/// the choice never depends on store row order.
pub(crate) async fn find_matching_sequence(
    conn: &mut PgConnection,
    sequence: &str,
    primer_id: Option<i64>,
    require_full_length: bool,
    no_longer: bool,
) -> Result<Option<i64>, sqlx::Error> {
    let Some(seed) = seed_prefix(sequence) else {
        return Ok(None);
    };

    let candidates: Vec<SeedCandidate> = match primer_id {
        Some(primer_id) => {
            sqlx::query_as(
                r#"
                SELECT id, sequence, length
                FROM sequences
                WHERE seed = $1 AND primer_id = $2
                ORDER BY id
                "#,
            )
            .bind(seed)
            .bind(primer_id)
            .fetch_all(&mut *conn)
            .await?
        },
        None => {
            sqlx::query_as(
                r#"
                SELECT id, sequence, length
                FROM sequences
                WHERE seed = $1
                ORDER BY id
                "#,
            )
            .bind(seed)
            .fetch_all(&mut *conn)
            .await?
        },
    };

    let query_len = sequence.len();
    let mut best: Option<(bool, usize, i64)> = None;

    for candidate in candidates {
        let stored_len = candidate.length as usize;
        if require_full_length && stored_len < query_len {
            continue;
        }
        if no_longer && stored_len > query_len {
            continue;
        }

        let compared = stored_len.min(query_len);
        if candidate.sequence.get(..compared) != sequence.get(..compared) {
            continue;
        }

        let exact = stored_len == query_len;
        let ranked = (exact, compared, candidate.id);
        let better = match best {
            None => true,
            Some((best_exact, best_compared, _)) => {
                (exact, compared) > (best_exact, best_compared)
            },
        };
        if better {
            best = Some(ranked);
        }
    }

    Ok(best.map(|(_, _, id)| id))
}

/// Resolve each normalized sequence to an id, inserting a new row when no
/// stored sequence matches. Returns ids in input order.
///
/// The insert is a single-statement upsert on `(sequence, primer_id)` so two
/// callers racing on the same brand-new sequence converge on one row.
pub(crate) async fn resolve_or_insert(
    conn: &mut PgConnection,
    sequences: &[String],
    primer_id: i64,
    taxonomies: Option<&[String]>,
    external_ids: Option<&[i64]>,
) -> Result<Vec<i64>, sqlx::Error> {
    let mut ids = Vec::with_capacity(sequences.len());

    for (position, sequence) in sequences.iter().enumerate() {
        if let Some(id) =
            find_matching_sequence(conn, sequence, Some(primer_id), false, false).await?
        {
            ids.push(id);
            continue;
        }

        let seed = seed_prefix(sequence).unwrap_or(sequence);
        let taxonomy = taxonomies.and_then(|t| t.get(position));
        let external_id = external_ids.and_then(|e| e.get(position));

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequences (sequence, length, seed, primer_id, taxonomy, external_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (sequence, primer_id)
            DO UPDATE SET length = EXCLUDED.length
            RETURNING id
            "#,
        )
        .bind(sequence)
        .bind(sequence.len() as i32)
        .bind(seed)
        .bind(primer_id)
        .bind(taxonomy)
        .bind(external_id)
        .fetch_one(&mut *conn)
        .await?;

        ids.push(id);
    }

    Ok(ids)
}
