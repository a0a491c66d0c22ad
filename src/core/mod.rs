// Shared value types
pub mod types;
