use tokenizers::normalizers::NormalizerWrapper;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
};

use super::Preprocess;
use crate::error::Result;

/// Normalizer + pre-tokenizer pair taken from a HuggingFace pipeline
///
/// Preprocessing runs the normalizer over the whole string, then lets the
/// pre-tokenizer split it. Every non-empty split is one piece. Without a
/// pre-tokenizer the normalized string is a single piece.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    normalizer: Option<NormalizerWrapper>,
    pre_tokenizer: Option<PreTokenizerWrapper>,
}

impl Preprocessor {
    pub fn new(
        normalizer: Option<NormalizerWrapper>,
        pre_tokenizer: Option<PreTokenizerWrapper>,
    ) -> Self {
        Self {
            normalizer,
            pre_tokenizer,
        }
    }

    pub fn with_normalizer(mut self, normalizer: impl Into<NormalizerWrapper>) -> Self {
        self.normalizer = Some(normalizer.into());
        self
    }

    pub fn with_pre_tokenizer(mut self, pre_tokenizer: impl Into<PreTokenizerWrapper>) -> Self {
        self.pre_tokenizer = Some(pre_tokenizer.into());
        self
    }

    pub fn normalizer(&self) -> Option<&NormalizerWrapper> {
        self.normalizer.as_ref()
    }

    pub fn pre_tokenizer(&self) -> Option<&PreTokenizerWrapper> {
        self.pre_tokenizer.as_ref()
    }
}

impl Preprocess for Preprocessor {
    fn preprocess(&self, text: &str) -> Result<Vec<String>> {
        let mut normalized = NormalizedString::from(text);
        if let Some(normalizer) = &self.normalizer {
            normalizer.normalize(&mut normalized)?;
        }

        let mut pretokenized = PreTokenizedString::from(normalized);
        if let Some(pre_tokenizer) = &self.pre_tokenizer {
            pre_tokenizer.pre_tokenize(&mut pretokenized)?;
        }

        let pieces = pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Char)
            .into_iter()
            .map(|(piece, _, _)| piece)
            .filter(|piece| !piece.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(pieces)
    }
}
