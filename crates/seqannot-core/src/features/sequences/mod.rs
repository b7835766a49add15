//! Sequence resolution feature
//!
//! Maps raw nucleotide reads of arbitrary length to stable integer
//! identities. Candidate lookup goes through the denormalized seed column
//! (first [`seqannot_common::types::SEED_LEN`] characters) so matching costs
//! O(seed-colliding set) instead of a full scan; within the candidate set
//! matching is an exact comparison over the shared prefix of length
//! `min(len(stored), len(query))`.

pub mod commands;
pub mod queries;
pub(crate) mod resolve;

pub use commands::add::{AddSequencesCommand, AddSequencesError};
pub use queries::get_id::{GetSequenceIdError, GetSequenceIdQuery};
pub use queries::get_ids::{GetSequenceIdsError, GetSequenceIdsQuery};
