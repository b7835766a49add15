//! Ontology graph feature
//!
//! Multi-rooted controlled-vocabulary hierarchy. Terms are
//! vocabulary-independent rows keyed by lowercase description; each named
//! vocabulary contributes its own directed parent edges over the shared term
//! set. Synonyms alias alternate spellings to canonical term ids and are
//! consulted only when a literal description lookup misses.
//!
//! Terms carry two denormalized usage counters (`seq_count`,
//! `annotation_count`); every counter mutation funnels through
//! [`counters::bump_term_counters`] and runs inside the same transaction as
//! the structural change that justifies it.

pub mod commands;
pub(crate) mod counters;
pub mod queries;
pub(crate) mod terms;
pub(crate) mod traversal;

pub use commands::add_term::{AddTermCommand, AddTermError};
pub use queries::get_parents::{GetParentsError, GetParentsQuery};
pub use queries::get_term_annotations::{GetTermAnnotationsError, GetTermAnnotationsQuery};
