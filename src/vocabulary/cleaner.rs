use std::collections::HashSet;

use log::{info, warn};

use super::pattern::RemovalPattern;
use crate::core::types::{AddedTokenOptions, CleaningReport, CleaningStats, IssueKind, VocabIssue};
use crate::error::Result;
use crate::tokenizer::{Preprocess, TokenizerModel};

/// Merges candidate tokens into the model's vocabulary
///
/// With a removal pattern, existing tokens matching it are removed first.
/// Each candidate is then preprocessed once:
/// - no pieces: dropped as empty;
/// - several pieces: the raw candidate becomes an added token;
/// - one piece already known (existing or accepted earlier): dropped as duplicate;
/// - one piece matching the removal pattern: dropped;
/// - otherwise the piece is queued as a new subword.
///
/// The queued subwords are added with preprocessing re-applied, then the
/// multi-word candidates are added as non-special, normalized added tokens.
/// Every skipped or diverted candidate is logged at warn level and recorded in
/// the returned report.
///
/// # Arguments
/// * `model` - The model to update, consumed and returned
/// * `vocabulary_to_add` - Candidate tokens, processed in order
/// * `token_remove_regex` - Optional pattern dropping existing tokens and candidates
///
/// # Returns
/// * `Result<(M, CleaningReport)>` - The updated model and what happened to
///   each candidate that was not added as a plain subword
///
/// # Errors
/// Only failures of the model itself are returned, unchanged: preprocessing
/// errors and rejected vocabulary updates.
pub fn clean_and_create_vocabulary<M, S>(
    mut model: M,
    vocabulary_to_add: &[S],
    token_remove_regex: Option<&RemovalPattern>,
) -> Result<(M, CleaningReport)>
where
    M: TokenizerModel,
    S: AsRef<str>,
{
    let mut report = CleaningReport::default();
    let mut stats = CleaningStats::default();

    if let Some(pattern) = token_remove_regex {
        let tokens_to_remove: Vec<String> = model
            .sorted_vocabulary()
            .into_iter()
            .filter(|token| pattern.is_match_at_start(token))
            .collect();
        model = model.remove_tokens_from_vocabulary(&tokens_to_remove)?;
        stats.regex_removed = tokens_to_remove.len();
        report.removed_existing = tokens_to_remove;
    }

    let mut seen_tokens: HashSet<String> = model.sorted_vocabulary().into_iter().collect();
    let mut tokens_to_add: Vec<String> = Vec::new();
    let mut added_tokens_to_add: Vec<String> = Vec::new();

    let preprocessor = model.preprocessor();
    for candidate in vocabulary_to_add {
        let candidate = candidate.as_ref();
        let mut preprocessed = preprocessor.preprocess(candidate)?;

        let kind = match preprocessed.len() {
            0 => {
                stats.empty += 1;
                IssueKind::Empty
            }
            1 => {
                let token = preprocessed.remove(0);
                if seen_tokens.contains(&token) {
                    stats.duplicate += 1;
                    IssueKind::Duplicate { resolved: token }
                } else if token_remove_regex.is_some_and(|pattern| pattern.is_match_at_start(&token)) {
                    stats.regex_removed += 1;
                    IssueKind::RegexMatch { resolved: token }
                } else {
                    seen_tokens.insert(token.clone());
                    tokens_to_add.push(token);
                    continue;
                }
            }
            _ => {
                added_tokens_to_add.push(candidate.to_string());
                IssueKind::MultiWord {
                    pieces: preprocessed,
                }
            }
        };

        let issue = VocabIssue {
            candidate: candidate.to_string(),
            kind,
        };
        warn!("{}", issue);
        report.issues.push(issue);
    }

    model = model.add_tokens_to_vocabulary(&tokens_to_add, true)?;
    model = model.add_added_tokens(&added_tokens_to_add, AddedTokenOptions::MULTI_WORD)?;

    stats.multiword = added_tokens_to_add.len();
    report_statistics(&stats);

    report.stats = stats;
    report.added = tokens_to_add;
    report.added_tokens = added_tokens_to_add;
    Ok((model, report))
}

fn report_statistics(stats: &CleaningStats) {
    if stats.multiword > 0 {
        info!("Added {} multi-word tokens to the vocabulary.", stats.multiword);
    }
    if stats.duplicate > 0 {
        info!("Removed {} duplicate tokens.", stats.duplicate);
    }
    if stats.regex_removed > 0 {
        info!("Removed {} tokens due to regex match.", stats.regex_removed);
    }
    if stats.empty > 0 {
        info!("Removed {} empty tokens.", stats.empty);
    }
}
