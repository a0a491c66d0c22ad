use crate::error::Result;
use crate::tokenizer::{Encode, TokenizerModel};

/// How a vocabulary hit with ID 0 is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroIdPolicy {
    /// A token whose ID is 0 skips the lookup and goes through the encoder,
    /// as if it were missing from the vocabulary.
    #[default]
    Reencode,
    /// Any token present in the vocabulary uses the lookup, including ID 0.
    FastPath,
}

impl ZeroIdPolicy {
    fn allows(self, id: u32) -> bool {
        match self {
            ZeroIdPolicy::Reencode => id != 0,
            ZeroIdPolicy::FastPath => true,
        }
    }
}

/// Converts each token into its ID sequence, with [`ZeroIdPolicy::Reencode`]
pub fn turn_tokens_into_ids<M, S>(tokens: &[S], model: &M) -> Result<Vec<Vec<u32>>>
where
    M: TokenizerModel,
    S: AsRef<str>,
{
    turn_tokens_into_ids_with(tokens, model, ZeroIdPolicy::default())
}

/// Converts each token into its ID sequence, one sequence per token.
///
/// A token found in the vocabulary becomes `bos ++ [id] ++ eos`. Anything
/// else is fully encoded and the encoder's IDs are used as they are, without
/// adding BOS or EOS.
///
/// # Arguments
/// * `tokens` - Raw token strings
/// * `model` - Model providing the vocabulary, BOS/EOS IDs and the encoder
/// * `policy` - Whether a hit with ID 0 takes the lookup or the encoder
///
/// # Returns
/// * `Result<Vec<Vec<u32>>>` - One ID sequence per input token, same order
///
/// # Errors
/// Returns the model's error if the encoder cannot be built or fails on a
/// token that takes the encode path.
pub fn turn_tokens_into_ids_with<M, S>(
    tokens: &[S],
    model: &M,
    policy: ZeroIdPolicy,
) -> Result<Vec<Vec<u32>>>
where
    M: TokenizerModel,
    S: AsRef<str>,
{
    let prefix = model.bos_ids().unwrap_or_default();
    let suffix = model.eos_ids().unwrap_or_default();
    let vocabulary = model.vocabulary();
    let encoder = model.to_encoder()?;

    let mut token_ids: Vec<Vec<u32>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.as_ref();
        match vocabulary.get(token).copied().filter(|&id| policy.allows(id)) {
            Some(token_id) => {
                let mut ids = Vec::with_capacity(prefix.len() + 1 + suffix.len());
                ids.extend_from_slice(&prefix);
                ids.push(token_id);
                ids.extend_from_slice(&suffix);
                token_ids.push(ids);
            }
            None => token_ids.push(encoder.encode(token)?.ids),
        }
    }
    Ok(token_ids)
}
