//! Token set similarity between two free-text strings.

use std::collections::HashSet;

use crate::text::tokenize;

/// Jaccard index over the token sets of two strings.
///
/// Both inputs are lowercased and split on non-word boundaries; the score
/// is `|intersection| / |union|` in `[0, 1]`. An empty union (both inputs
/// empty or punctuation-only) scores 0. Symmetric by construction. No
/// stemming, no synonymy.
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<String> = tokenize(a).into_iter().collect();
    let set_b: HashSet<String> = tokenize(b).into_iter().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();

    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        assert!((token_set_similarity("user likes rust", "user likes rust") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symmetric() {
        let ab = token_set_similarity("user asked about memory", "user questioned about storage");
        let ba = token_set_similarity("user questioned about storage", "user asked about memory");
        assert!((ab - ba).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounded() {
        let score = token_set_similarity("alpha beta gamma", "gamma delta epsilon");
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(token_set_similarity("", ""), 0.0);
        assert_eq!(token_set_similarity("...", "---"), 0.0);
    }

    #[test]
    fn test_disjoint_strings_score_zero() {
        assert_eq!(token_set_similarity("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let score = token_set_similarity("User LIKES Rust!", "user likes rust");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_overlap() {
        // {user, asked, about, memory} vs {user, questioned, about, storage}
        // -> 2 shared of 6 total
        let score =
            token_set_similarity("User asked about memory", "User questioned about storage");
        assert!((score - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_tokens_count_once() {
        let score = token_set_similarity("rust rust rust", "rust");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }
}
