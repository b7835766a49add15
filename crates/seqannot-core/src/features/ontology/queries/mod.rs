pub mod get_parents;
pub mod get_term_annotations;
