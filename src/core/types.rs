use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Flags attached to every added token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddedTokenOptions {
    /// Special tokens are skipped when decoding
    pub special: bool,
    /// Only match the token on word boundaries
    pub single_word: bool,
    /// Match against the normalized input instead of the raw input
    pub normalized: bool,
}

impl AddedTokenOptions {
    /// Options used for multi-word candidates diverted by the cleaner
    pub const MULTI_WORD: AddedTokenOptions = AddedTokenOptions {
        special: false,
        single_word: false,
        normalized: true,
    };
}

/// Result of a full encode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    pub ids: Vec<u32>,
}

/// Counts of every candidate the cleaner skipped or diverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningStats {
    /// Candidates split into several pieces, registered as added tokens
    pub multiword: usize,
    /// Candidates whose piece was already known
    pub duplicate: usize,
    /// Existing tokens and candidates dropped by the removal pattern
    pub regex_removed: usize,
    /// Candidates that preprocessed to nothing
    pub empty: usize,
}

impl CleaningStats {
    pub fn total(&self) -> usize {
        self.multiword + self.duplicate + self.regex_removed + self.empty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    Empty,
    MultiWord { pieces: Vec<String> },
    Duplicate { resolved: String },
    RegexMatch { resolved: String },
}

/// One skipped or diverted candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabIssue {
    /// The candidate as it was passed in
    pub candidate: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for VocabIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Empty => {
                write!(f, "Token '{}' was empty after preprocessing.", self.candidate)
            }
            IssueKind::MultiWord { pieces } => {
                let split_into = pieces
                    .iter()
                    .map(|piece| format!("'{}'", piece))
                    .collect::<Vec<_>>()
                    .join(",");
                write!(
                    f,
                    "Token '{}' was split into multiple tokens after preprocessing: [{}]",
                    self.candidate, split_into
                )
            }
            IssueKind::Duplicate { resolved } => {
                write!(f, "Token '{}' was already in the vocabulary.", resolved)
            }
            IssueKind::RegexMatch { resolved } => {
                write!(f, "Token '{}' was removed due to regex match.", resolved)
            }
        }
    }
}

/// Everything the cleaner found while merging candidates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub stats: CleaningStats,
    /// Issues in candidate order
    pub issues: Vec<VocabIssue>,
    /// Existing vocabulary tokens removed by the pattern before any candidate was looked at
    pub removed_existing: Vec<String>,
    /// Candidates accepted as plain subwords, in the order they were added
    pub added: Vec<String>,
    /// Candidates registered as added tokens
    pub added_tokens: Vec<String>,
}

impl CleaningReport {
    pub fn issues_of<'a>(
        &'a self,
        matches: impl Fn(&IssueKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a VocabIssue> + 'a {
        self.issues.iter().filter(move |issue| matches(&issue.kind))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
