//! Feature modules (vertical slices)
//!
//! Each feature owns its commands (writes) and queries (reads), with one
//! request type, error enum, and `handle` function per operation.
//!
//! - **sequences**: raw read -> stable integer identity resolution
//! - **ontology**: controlled-vocabulary term graph and usage counters
//! - **annotations**: curation events linking sequences to ontology terms

pub mod annotations;
pub mod ontology;
pub mod sequences;
pub mod shared;
