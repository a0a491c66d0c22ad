pub mod core;
pub mod error;
pub mod tokenizer;
pub mod vocabulary;

pub use crate::core::types::{
    AddedTokenOptions, CleaningReport, CleaningStats, Encoded, IssueKind, VocabIssue,
};
pub use error::{Error, Result};
pub use tokenizer::{Encode, Preprocess, Preprocessor, SubwordEncoder, SubwordModel, TokenizerModel};
pub use vocabulary::{
    clean_and_create_vocabulary, turn_tokens_into_ids, turn_tokens_into_ids_with, RemovalPattern,
    ZeroIdPolicy,
};
