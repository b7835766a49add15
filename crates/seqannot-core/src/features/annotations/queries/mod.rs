pub mod get_fast;
