//! Batched annotation aggregation query
//!
//! Resolves many query reads in one pass and returns every distinct visible
//! annotation they touch exactly once. Term statistics are gathered into a
//! single set during the walk and looked up in one batched query at the
//! end, never per annotation or per sequence.

use std::collections::{HashMap, HashSet};

use mediator::Request;
use seqannot_common::types::{normalize_sequence, DetailType, ONTOLOGY_ROOT};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::annotations::details;
use crate::features::ontology::traversal;
use crate::features::sequences::resolve;
use crate::models::{Annotation, AnnotationRecord, FastAnnotations, TermStats};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetFastAnnotationsQuery {
    pub sequences: Vec<String>,
    /// Primer/region name restricting the sequence match; `None` matches
    /// across regions
    #[serde(rename = "region", skip_serializing_if = "Option::is_none")]
    pub primer: Option<String>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(rename = "getTermInfo", default = "default_true")]
    pub get_term_info: bool,
    #[serde(rename = "getTaxonomy", default)]
    pub get_taxonomy: bool,
    /// Expand every detail term to its ancestor closure; when off only the
    /// literal detail terms are accumulated
    #[serde(rename = "getParents", default = "default_true")]
    pub get_parents: bool,
    /// Also materialize every other annotation sharing an experiment with a
    /// directly linked one
    #[serde(rename = "getAllExpAnnotations", default)]
    pub get_all_exp_annotations: bool,
}

impl GetFastAnnotationsQuery {
    pub fn new(sequences: Vec<String>) -> Self {
        Self {
            sequences,
            primer: None,
            user_id: None,
            get_term_info: true,
            get_taxonomy: false,
            get_parents: true,
            get_all_exp_annotations: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetFastAnnotationsError {
    #[error("Primer '{0}' not found")]
    PrimerNotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetFastAnnotationsError> for AppError {
    fn from(err: GetFastAnnotationsError) -> Self {
        match err {
            GetFastAnnotationsError::PrimerNotFound(_) => AppError::NotFound(err.to_string()),
            GetFastAnnotationsError::Database(e) => AppError::Database(e),
        }
    }
}

impl Request<Result<FastAnnotations, GetFastAnnotationsError>> for GetFastAnnotationsQuery {}

impl crate::cqrs::middleware::Query for GetFastAnnotationsQuery {}

/// Accumulated term string for one detail: the `"low"` detail type carries
/// a `"-"` prefix so depleted terms stay distinguishable in `termInfo`.
fn accumulate(term_set: &mut HashSet<String>, detail_type: &str, term: &str) {
    if detail_type == DetailType::Low.as_str() {
        term_set.insert(format!("-{}", term));
    } else {
        term_set.insert(term.to_string());
    }
}

#[tracing::instrument(skip(pool, query), fields(count = query.sequences.len()))]
pub async fn handle(
    pool: PgPool,
    query: GetFastAnnotationsQuery,
) -> Result<FastAnnotations, GetFastAnnotationsError> {
    let mut conn = pool.acquire().await?;

    let primer_id = match &query.primer {
        Some(name) => Some(
            resolve::find_primer_id(&mut conn, name)
                .await?
                .ok_or_else(|| GetFastAnnotationsError::PrimerNotFound(name.clone()))?,
        ),
        None => None,
    };

    let mut result = FastAnnotations::default();
    // Ids already fetched and rejected by the visibility rule; never refetched
    let mut hidden: HashSet<i64> = HashSet::new();
    let mut expanded_experiments: HashSet<i64> = HashSet::new();
    let mut closure_cache: HashMap<String, Option<Vec<String>>> = HashMap::new();
    let mut term_set: HashSet<String> = HashSet::new();

    for (position, raw) in query.sequences.iter().enumerate() {
        let sequence = normalize_sequence(raw);
        let sequence_id =
            resolve::find_matching_sequence(&mut conn, &sequence, primer_id, false, false).await?;

        // Unresolved reads contribute nothing; they never abort the batch
        let Some(sequence_id) = sequence_id else {
            if query.get_taxonomy {
                result.taxonomy.push(ONTOLOGY_ROOT.to_string());
            }
            continue;
        };

        if query.get_taxonomy {
            let taxonomy: Option<String> =
                sqlx::query_scalar("SELECT taxonomy FROM sequences WHERE id = $1")
                    .bind(sequence_id)
                    .fetch_one(&mut *conn)
                    .await?;
            result
                .taxonomy
                .push(taxonomy.unwrap_or_else(|| ONTOLOGY_ROOT.to_string()));
        }

        let linked: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT annotation_id FROM sequence_annotations
            WHERE sequence_id = $1
            ORDER BY annotation_id
            "#,
        )
        .bind(sequence_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut worklist = linked.clone();
        while let Some(annotation_id) = worklist.pop() {
            if result.annotations.contains_key(&annotation_id) || hidden.contains(&annotation_id) {
                continue;
            }

            let annotation: Option<Annotation> = sqlx::query_as(
                r#"
                SELECT id, experiment_id, user_id, annotation_type, method, agent_type,
                       description, is_private, seq_count, created_at
                FROM annotations
                WHERE id = $1
                "#,
            )
            .bind(annotation_id)
            .fetch_optional(&mut *conn)
            .await?;
            let Some(annotation) = annotation else {
                hidden.insert(annotation_id);
                continue;
            };
            if !annotation.visible_to(query.user_id) {
                hidden.insert(annotation_id);
                continue;
            }

            let annotation_details = details::fetch_details(&mut conn, annotation_id).await?;

            for detail in &annotation_details {
                if query.get_parents {
                    if !closure_cache.contains_key(&detail.term) {
                        let closure = traversal::ancestor_closure(&mut conn, &detail.term).await?;
                        closure_cache.insert(detail.term.clone(), closure);
                    }
                    match closure_cache.get(&detail.term) {
                        Some(Some(closure)) => {
                            for term in closure {
                                accumulate(&mut term_set, &detail.detail_type, term);
                            }
                        },
                        // Term absent from the ontology: fall back to the literal
                        _ => accumulate(&mut term_set, &detail.detail_type, &detail.term),
                    }
                } else {
                    accumulate(&mut term_set, &detail.detail_type, &detail.term);
                }
            }

            if query.get_all_exp_annotations
                && expanded_experiments.insert(annotation.experiment_id)
            {
                let peers: Vec<i64> =
                    sqlx::query_scalar("SELECT id FROM annotations WHERE experiment_id = $1")
                        .bind(annotation.experiment_id)
                        .fetch_all(&mut *conn)
                        .await?;
                worklist.extend(peers);
            }

            result.annotations.insert(
                annotation_id,
                AnnotationRecord {
                    annotation,
                    details: annotation_details,
                },
            );
        }

        let visible: Vec<i64> = linked
            .into_iter()
            .filter(|id| result.annotations.contains_key(id))
            .collect();
        result.seq_annotations.push((position, visible));
    }

    if query.get_term_info && !term_set.is_empty() {
        // The one batched statistics lookup for the whole walk. Keys in the
        // response keep their accumulated form; the "-" prefix is stripped
        // only for the store lookup.
        let stripped: Vec<String> = term_set
            .iter()
            .map(|term| term.strip_prefix('-').unwrap_or(term).to_string())
            .collect();
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT description, annotation_count, seq_count
            FROM ontology_terms
            WHERE description = ANY($1)
            "#,
        )
        .bind(&stripped)
        .fetch_all(&mut *conn)
        .await?;
        let stats: HashMap<String, (i64, i64)> = rows
            .into_iter()
            .map(|(description, annotations, sequences)| (description, (annotations, sequences)))
            .collect();

        for term in &term_set {
            let key = term.strip_prefix('-').unwrap_or(term);
            if let Some(&(total_annotations, total_sequences)) = stats.get(key) {
                result.term_info.insert(
                    term.clone(),
                    TermStats {
                        total_annotations,
                        total_sequences,
                    },
                );
            }
        }
    }

    tracing::debug!(
        annotations = result.annotations.len(),
        terms = result.term_info.len(),
        "fast annotations aggregated"
    );

    Ok(result)
}
