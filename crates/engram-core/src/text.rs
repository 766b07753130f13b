//! Shared text utilities for similarity, summarization and keyword
//! extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Word-boundary splitter shared by every tokenizing component.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Common English function words excluded from keyword extraction.
///
/// Tokens of length <= 3 are dropped before this list applies, so short
/// function words ("the", "and", "for") never reach it.
pub const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "from", "have", "been", "were", "what", "when", "will", "would",
    "could", "should", "about", "which", "their",
];

/// Lowercase and split on non-word boundaries, dropping empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    NON_WORD
        .split(&text.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a token is on the fixed stop-word list.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}
