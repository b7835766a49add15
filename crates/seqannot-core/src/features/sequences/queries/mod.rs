pub mod get_id;
pub mod get_ids;
