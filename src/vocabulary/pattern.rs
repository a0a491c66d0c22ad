use regex::Regex;

use crate::error::{Error, Result};

/// Regex used to drop vocabulary entries
///
/// A token matches when the regex matches starting at its first character.
/// The match does not have to cover the whole token.
#[derive(Debug, Clone)]
pub struct RemovalPattern {
    pattern: String,
    /// `pattern` wrapped as `^(?:pattern)`
    anchored: Regex,
}

impl RemovalPattern {
    /// Compiles a removal pattern
    ///
    /// # Arguments
    /// * `pattern` - Regular expression in `regex` crate syntax, without any anchor
    ///
    /// # Errors
    /// Returns [`Error::InvalidPattern`] if `pattern` does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        // Checked on its own first: wrapping can make an unbalanced pattern valid
        Regex::new(pattern)?;
        let anchored = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Self {
            pattern: pattern.to_string(),
            anchored,
        })
    }

    /// The pattern as it was given, without the anchor
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match_at_start(&self, token: &str) -> bool {
        self.anchored.is_match(token)
    }
}

impl TryFrom<Regex> for RemovalPattern {
    type Error = Error;

    /// Re-compiles `regex` with a start anchor. Builder options set on `regex`
    /// (case folding, size limits) are not carried over; use inline flags.
    fn try_from(regex: Regex) -> Result<Self> {
        Self::new(regex.as_str())
    }
}
