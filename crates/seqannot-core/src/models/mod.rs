//! Database models and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Amplified marker region a read was generated from; scopes sequence
/// matching.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Primer {
    pub id: i64,
    pub name: String,
    pub forward_primer: Option<String>,
    pub reverse_primer: Option<String>,
}

/// Stored marker sequence with its denormalized seed prefix
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sequence {
    pub id: i64,
    pub sequence: String,
    pub length: i32,
    pub seed: String,
    pub primer_id: i64,
    pub taxonomy: Option<String>,
    pub external_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Ontology term with denormalized usage counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OntologyTerm {
    pub id: i64,
    pub description: String,
    pub seq_count: i64,
    pub annotation_count: i64,
}

/// Experiment row referenced by annotations. Experiment CRUD is handled
/// outside the core; only existence and visibility matter here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experiment {
    pub id: i64,
    pub description: Option<String>,
    pub user_id: Option<i64>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

/// Annotation row. `user_id` of `None` marks an anonymous curation event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Annotation {
    pub id: i64,
    pub experiment_id: i64,
    pub user_id: Option<i64>,
    pub annotation_type: String,
    pub method: Option<String>,
    pub agent_type: Option<String>,
    pub description: Option<String>,
    pub is_private: bool,
    pub seq_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    /// Visibility rule applied uniformly to read results: an annotation is
    /// visible unless it is private and the caller is not its creator.
    pub fn visible_to(&self, user_id: Option<i64>) -> bool {
        if !self.is_private {
            return true;
        }
        match (self.user_id, user_id) {
            (Some(owner), Some(caller)) => owner == caller,
            _ => false,
        }
    }

    /// Mutation rule: only the creating user may change an annotation;
    /// anonymous-created annotations may be changed by anyone.
    pub fn mutable_by(&self, user_id: Option<i64>) -> bool {
        match self.user_id {
            None => true,
            Some(owner) => user_id == Some(owner),
        }
    }
}

/// A literal (detail type, term description) assertion on an annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AnnotationDetail {
    pub detail_type: String,
    pub term: String,
}

/// Fully materialized annotation: the row plus its literal detail list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(flatten)]
    pub annotation: Annotation,
    pub details: Vec<AnnotationDetail>,
}

/// Aggregate usage statistics for one ontology term
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TermStats {
    #[serde(rename = "totalAnnotations")]
    pub total_annotations: i64,
    #[serde(rename = "totalSequences")]
    pub total_sequences: i64,
}

/// Compact multi-sequence annotation response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FastAnnotations {
    /// Every distinct visible annotation touched by the query, keyed by id
    pub annotations: HashMap<i64, AnnotationRecord>,
    /// Per query-sequence position, the ids of its directly linked
    /// annotations; unresolved positions are absent
    #[serde(rename = "seqAnnotations")]
    pub seq_annotations: Vec<(usize, Vec<i64>)>,
    /// One batched statistics lookup over every term string accumulated
    /// during the walk (empty unless requested)
    #[serde(rename = "termInfo")]
    pub term_info: HashMap<String, TermStats>,
    /// Stored taxonomy per query position, "na" for unresolved sequences
    /// (empty unless requested)
    pub taxonomy: Vec<String>,
}
