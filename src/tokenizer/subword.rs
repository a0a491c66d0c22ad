use std::collections::{HashMap, HashSet};

use ahash::AHashMap;
use log::debug;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::{AddedToken, Tokenizer};

use super::{Encode, Preprocess, Preprocessor, TokenizerModel};
use crate::core::types::{AddedTokenOptions, Encoded};
use crate::error::{Error, Result};

const DEFAULT_UNK_TOKEN: &str = "[UNK]";
const DEFAULT_CONTINUING_SUBWORD_PREFIX: &str = "##";

#[derive(Debug, Clone)]
struct VocabEntry {
    content: String,
    /// `None` for plain subwords
    added: Option<AddedTokenOptions>,
}

/// In-memory subword tokenizer model
///
/// Token IDs are positions in an ordered entry list: appending a token gives it
/// the next free ID, removing tokens renumbers the survivors without changing
/// their relative order. Added tokens share the same ID space as plain
/// subwords and keep their [`AddedTokenOptions`].
#[derive(Debug, Clone)]
pub struct SubwordModel {
    entries: Vec<VocabEntry>,
    ids: HashMap<String, u32>,
    preprocessor: Preprocessor,
    bos_tokens: Option<Vec<String>>,
    eos_tokens: Option<Vec<String>>,
    unk_token: String,
    continuing_subword_prefix: String,
}

impl SubwordModel {
    /// Builds a model whose IDs follow the order of `tokens`
    ///
    /// # Errors
    /// Returns [`Error::DuplicateToken`] if a token appears twice.
    pub fn new<I, S>(tokens: I, preprocessor: Preprocessor) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut model = Self {
            entries: Vec::new(),
            ids: HashMap::new(),
            preprocessor,
            bos_tokens: None,
            eos_tokens: None,
            unk_token: DEFAULT_UNK_TOKEN.to_string(),
            continuing_subword_prefix: DEFAULT_CONTINUING_SUBWORD_PREFIX.to_string(),
        };
        for token in tokens {
            model.push(token.into(), None)?;
        }
        Ok(model)
    }

    pub fn with_bos<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bos_tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_eos<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eos_tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_unk_token(mut self, unk_token: impl Into<String>) -> Self {
        self.unk_token = unk_token.into();
        self
    }

    pub fn with_continuing_subword_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.continuing_subword_prefix = prefix.into();
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.entries
            .get(id as usize)
            .map(|entry| entry.content.as_str())
    }

    /// Added tokens with their options, in ID order
    pub fn added_tokens(&self) -> impl Iterator<Item = (&str, AddedTokenOptions)> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.added.map(|options| (entry.content.as_str(), options)))
    }

    fn push(&mut self, content: String, added: Option<AddedTokenOptions>) -> Result<()> {
        if self.ids.contains_key(&content) {
            return Err(Error::DuplicateToken(content));
        }
        let id = self.entries.len() as u32;
        self.ids.insert(content.clone(), id);
        self.entries.push(VocabEntry { content, added });
        Ok(())
    }

    fn reindex(&mut self) {
        self.ids = self
            .entries
            .iter()
            .enumerate()
            .map(|(id, entry)| (entry.content.clone(), id as u32))
            .collect();
    }

    fn lookup_all(&self, tokens: Option<&[String]>) -> Option<Vec<u32>> {
        tokens.map(|tokens| tokens.iter().filter_map(|token| self.token_to_id(token)).collect())
    }
}

impl TokenizerModel for SubwordModel {
    type Preprocessor = Preprocessor;
    type Encoder = SubwordEncoder;

    fn sorted_vocabulary(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.content.clone()).collect()
    }

    fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    fn remove_tokens_from_vocabulary(mut self, tokens: &[String]) -> Result<Self> {
        if let Some(missing) = tokens.iter().find(|token| !self.ids.contains_key(*token)) {
            return Err(Error::UnknownToken(missing.clone()));
        }
        let to_remove: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        self.entries
            .retain(|entry| !to_remove.contains(entry.content.as_str()));
        self.reindex();
        debug!(
            "Removed {} tokens, {} remain in the vocabulary",
            to_remove.len(),
            self.entries.len()
        );
        Ok(self)
    }

    fn add_tokens_to_vocabulary(mut self, tokens: &[String], preprocess_tokens: bool) -> Result<Self> {
        for token in tokens {
            let content = if preprocess_tokens {
                let mut pieces = self.preprocessor.preprocess(token)?;
                if pieces.len() != 1 {
                    return Err(Error::NotSingleSubword {
                        token: token.clone(),
                        pieces: pieces.len(),
                    });
                }
                pieces.remove(0)
            } else {
                token.clone()
            };
            self.push(content, None)?;
        }
        Ok(self)
    }

    fn add_added_tokens(mut self, tokens: &[String], options: AddedTokenOptions) -> Result<Self> {
        for token in tokens {
            if self.ids.contains_key(token) {
                debug!("Added token '{}' is already in the vocabulary, skipping", token);
                continue;
            }
            self.push(token.clone(), Some(options))?;
        }
        Ok(self)
    }

    fn vocabulary(&self) -> HashMap<String, u32> {
        self.ids.clone()
    }

    fn bos_ids(&self) -> Option<Vec<u32>> {
        self.lookup_all(self.bos_tokens.as_deref())
    }

    fn eos_ids(&self) -> Option<Vec<u32>> {
        self.lookup_all(self.eos_tokens.as_deref())
    }

    fn to_encoder(&self) -> Result<SubwordEncoder> {
        let wordpiece = WordPiece::builder()
            .vocab(self.ids.clone().into_iter().collect::<AHashMap<String, u32>>())
            .unk_token(self.unk_token.clone())
            .continuing_subword_prefix(self.continuing_subword_prefix.clone())
            .build()?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(self.preprocessor.normalizer().cloned());
        tokenizer.with_pre_tokenizer(self.preprocessor.pre_tokenizer().cloned());

        let (special, added): (Vec<AddedToken>, Vec<AddedToken>) = self
            .added_tokens()
            .map(|(content, options)| {
                AddedToken::from(content.to_string(), options.special)
                    .single_word(options.single_word)
                    .normalized(options.normalized)
            })
            .partition(|token| token.special);
        tokenizer.add_tokens(&added);
        tokenizer.add_special_tokens(&special);

        Ok(SubwordEncoder {
            tokenizer,
            prefix: self.bos_ids().unwrap_or_default(),
            suffix: self.eos_ids().unwrap_or_default(),
        })
    }
}

/// WordPiece encoder over a snapshot of a [`SubwordModel`]
///
/// Encoded sequences are wrapped in the model's BOS and EOS IDs.
pub struct SubwordEncoder {
    tokenizer: Tokenizer,
    prefix: Vec<u32>,
    suffix: Vec<u32>,
}

impl Encode for SubwordEncoder {
    fn encode(&self, text: &str) -> Result<Encoded> {
        let encoding = self.tokenizer.encode(text, false)?;

        let mut ids = Vec::with_capacity(self.prefix.len() + encoding.len() + self.suffix.len());
        ids.extend_from_slice(&self.prefix);
        ids.extend_from_slice(encoding.get_ids());
        ids.extend_from_slice(&self.suffix);
        Ok(Encoded { ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenizers::normalizers::Lowercase;
    use tokenizers::pre_tokenizers::whitespace::Whitespace;

    fn preprocessor() -> Preprocessor {
        Preprocessor::default()
            .with_normalizer(Lowercase)
            .with_pre_tokenizer(Whitespace::default())
    }

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let model = SubwordModel::new(["[UNK]", "a", "b"], preprocessor()).unwrap();
        assert_eq!(model.token_to_id("[UNK]"), Some(0));
        assert_eq!(model.token_to_id("b"), Some(2));
        assert_eq!(model.sorted_vocabulary(), strings(&["[UNK]", "a", "b"]));
    }

    #[test]
    fn test_duplicate_construction_fails() {
        let result = SubwordModel::new(["a", "a"], preprocessor());
        assert!(matches!(result, Err(Error::DuplicateToken(token)) if token == "a"));
    }

    #[test]
    fn test_remove_renumbers_survivors() {
        let model = SubwordModel::new(["a", "x1", "b", "x2", "c"], preprocessor())
            .unwrap()
            .remove_tokens_from_vocabulary(&strings(&["x1", "x2"]))
            .unwrap();
        assert_eq!(model.sorted_vocabulary(), strings(&["a", "b", "c"]));
        assert_eq!(model.token_to_id("c"), Some(2));
        assert_eq!(model.id_to_token(1), Some("b"));
        assert_eq!(model.token_to_id("x1"), None);
    }

    #[test]
    fn test_remove_unknown_token_fails() {
        let model = SubwordModel::new(["a"], preprocessor()).unwrap();
        let result = model.remove_tokens_from_vocabulary(&strings(&["zzz"]));
        assert!(matches!(result, Err(Error::UnknownToken(token)) if token == "zzz"));
    }

    #[test]
    fn test_add_tokens_applies_preprocessing() {
        let model = SubwordModel::new(["a"], preprocessor())
            .unwrap()
            .add_tokens_to_vocabulary(&strings(&["Cat"]), true)
            .unwrap();
        assert_eq!(model.token_to_id("cat"), Some(1));
        assert_eq!(model.token_to_id("Cat"), None);
    }

    #[test]
    fn test_add_tokens_rejects_multiword() {
        let model = SubwordModel::new(["a"], preprocessor()).unwrap();
        let result = model.add_tokens_to_vocabulary(&strings(&["two words"]), true);
        assert!(matches!(
            result,
            Err(Error::NotSingleSubword { pieces: 2, .. })
        ));
    }

    #[test]
    fn test_add_existing_token_fails() {
        let model = SubwordModel::new(["a"], preprocessor()).unwrap();
        let result = model.add_tokens_to_vocabulary(&strings(&["a"]), false);
        assert!(matches!(result, Err(Error::DuplicateToken(_))));
    }

    #[test]
    fn test_added_tokens_keep_options() {
        let model = SubwordModel::new(["a"], preprocessor())
            .unwrap()
            .add_added_tokens(&strings(&["new york", "a", "new york"]), AddedTokenOptions::MULTI_WORD)
            .unwrap();
        let added: Vec<_> = model.added_tokens().collect();
        assert_eq!(added, vec![("new york", AddedTokenOptions::MULTI_WORD)]);
        assert_eq!(model.token_to_id("new york"), Some(1));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_bos_eos_ids() {
        let model = SubwordModel::new(["[UNK]", "[CLS]", "[SEP]"], preprocessor()).unwrap();
        assert_eq!(model.bos_ids(), None);
        assert_eq!(model.eos_ids(), None);

        let model = model.with_bos(["[CLS]"]).with_eos(["[SEP]"]);
        assert_eq!(model.bos_ids(), Some(vec![1]));
        assert_eq!(model.eos_ids(), Some(vec![2]));
    }

    #[test]
    fn test_encoder_splits_into_wordpieces() {
        let model = SubwordModel::new(["[UNK]", "hel", "##lo", "world"], preprocessor()).unwrap();
        let encoder = model.to_encoder().unwrap();
        assert_eq!(encoder.encode("Hello world").unwrap().ids, vec![1, 2, 3]);
        assert_eq!(encoder.encode("qqq").unwrap().ids, vec![0]);
    }

    #[test]
    fn test_encoder_wraps_with_special_ids() {
        let model = SubwordModel::new(["[UNK]", "[CLS]", "[SEP]", "hi"], preprocessor())
            .unwrap()
            .with_bos(["[CLS]"])
            .with_eos(["[SEP]"]);
        let encoder = model.to_encoder().unwrap();
        assert_eq!(encoder.encode("hi").unwrap().ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_encoder_matches_added_tokens() {
        let model = SubwordModel::new(["[UNK]", "new", "york"], preprocessor())
            .unwrap()
            .add_added_tokens(&strings(&["new york"]), AddedTokenOptions::MULTI_WORD)
            .unwrap();
        let encoder = model.to_encoder().unwrap();
        assert_eq!(encoder.encode("new york").unwrap().ids, vec![3]);
    }

    #[test]
    fn test_encoder_without_unk_token_fails() {
        let model = SubwordModel::new(["a"], preprocessor()).unwrap();
        let encoder = model.to_encoder().unwrap();

        let err = encoder.encode("zzz").unwrap_err();

        assert!(matches!(err, Error::Tokenizers(_)));
        // The error from the tokenizers crate stays reachable
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_custom_unk_token_and_prefix() {
        let model = SubwordModel::new(["<unk>", "hel", "@@lo"], preprocessor())
            .unwrap()
            .with_unk_token("<unk>")
            .with_continuing_subword_prefix("@@");
        let encoder = model.to_encoder().unwrap();

        assert_eq!(encoder.encode("hello").unwrap().ids, vec![1, 2]);
        assert_eq!(encoder.encode("zzz").unwrap().ids, vec![0]);
    }

    #[test]
    fn test_default_prefix_ignored_after_override() {
        // "##lo" no longer continues a word once the prefix is "@@"
        let model = SubwordModel::new(["<unk>", "hel", "##lo"], preprocessor())
            .unwrap()
            .with_unk_token("<unk>")
            .with_continuing_subword_prefix("@@");
        let encoder = model.to_encoder().unwrap();

        assert_eq!(encoder.encode("hello").unwrap().ids, vec![0]);
    }

    #[test]
    fn test_empty_model() {
        let model = SubwordModel::new(Vec::<String>::new(), preprocessor()).unwrap();
        assert!(model.is_empty());
        assert_eq!(model.len(), 0);

        let model = model
            .add_tokens_to_vocabulary(&strings(&["first"]), true)
            .unwrap();
        assert!(!model.is_empty());
        assert_eq!(model.token_to_id("first"), Some(0));
    }
}
