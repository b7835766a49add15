pub mod add_term;
