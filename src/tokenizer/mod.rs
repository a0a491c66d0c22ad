use std::collections::HashMap;

use crate::core::types::{AddedTokenOptions, Encoded};
use crate::error::Result;

/// Preprocessing built from a HuggingFace normalizer and pre-tokenizer
///
/// Produces the pieces the cleaner sorts candidates by: nothing for blank
/// input, one piece for a single word, several for phrases.
pub mod preprocessor;

/// In-memory model and WordPiece encoder, backed by the `tokenizers` crate
pub mod subword;

pub use preprocessor::Preprocessor;
pub use subword::{SubwordEncoder, SubwordModel};

/// Turns a raw string into the subword pieces the model would see
pub trait Preprocess {
    /// Returns zero, one or more pieces, in order
    fn preprocess(&self, text: &str) -> Result<Vec<String>>;
}

/// Full encode path, used for strings missing from the vocabulary
pub trait Encode {
    fn encode(&self, text: &str) -> Result<Encoded>;
}

/// Tokenizer model consumed by the vocabulary tools
///
/// The cleaner and the resolver only talk to a model through this trait.
/// Mutating operations consume the model and hand back the updated one, so
/// callers thread a single owned value through every step.
pub trait TokenizerModel: Sized {
    type Preprocessor: Preprocess;
    type Encoder: Encode;

    /// Vocabulary tokens in ascending ID order
    fn sorted_vocabulary(&self) -> Vec<String>;

    fn preprocessor(&self) -> &Self::Preprocessor;

    /// Removes `tokens` from the vocabulary
    ///
    /// # Errors
    /// Implementations reject tokens that are not in the vocabulary.
    fn remove_tokens_from_vocabulary(self, tokens: &[String]) -> Result<Self>;

    /// Appends `tokens` as plain subwords. With `preprocess_tokens` every
    /// token goes through the preprocessor first and must come out as a
    /// single piece.
    fn add_tokens_to_vocabulary(self, tokens: &[String], preprocess_tokens: bool) -> Result<Self>;

    fn add_added_tokens(self, tokens: &[String], options: AddedTokenOptions) -> Result<Self>;

    fn vocabulary(&self) -> HashMap<String, u32>;

    /// IDs prepended to every fast-path lookup, `None` when unset
    fn bos_ids(&self) -> Option<Vec<u32>>;

    /// IDs appended to every fast-path lookup, `None` when unset
    fn eos_ids(&self) -> Option<Vec<u32>>;

    fn to_encoder(&self) -> Result<Self::Encoder>;
}
