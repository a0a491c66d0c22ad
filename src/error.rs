use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid removal pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Token '{0}' is not in the vocabulary")]
    UnknownToken(String),

    #[error("Token '{0}' is already in the vocabulary")]
    DuplicateToken(String),

    #[error("Token '{token}' preprocessed into {pieces} pieces, expected exactly one")]
    NotSingleSubword { token: String, pieces: usize },

    #[error("Tokenizer error: {0}")]
    Tokenizers(#[from] tokenizers::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
