// Candidate filtering and merging
pub mod cleaner;
pub mod pattern;

// Token string to ID lookup
pub mod resolver;

pub use cleaner::clean_and_create_vocabulary;
pub use pattern::RemovalPattern;
pub use resolver::{turn_tokens_into_ids, turn_tokens_into_ids_with, ZeroIdPolicy};
