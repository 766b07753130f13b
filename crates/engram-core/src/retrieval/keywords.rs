//! Keyword extraction from a retrieval context.

use std::collections::HashMap;

use serde_json::Value;

use crate::text::{is_stop_word, tokenize};

/// Maximum keywords kept from a context.
pub const MAX_KEYWORDS: usize = 10;

/// Tokens this short carry too little signal to be keywords.
const MIN_KEYWORD_LEN: usize = 4;

/// A retrieval context: free text or a structured blob.
///
/// Structured contexts are serialized to JSON text before keyword
/// extraction, so keys and values both contribute keywords.
#[derive(Debug, Clone)]
pub enum Context {
    Text(String),
    Structured(Value),
}

impl Context {
    fn as_text(&self) -> String {
        match self {
            Context::Text(text) => text.clone(),
            Context::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for Context {
    fn from(text: &str) -> Self {
        Context::Text(text.to_string())
    }
}

impl From<String> for Context {
    fn from(text: String) -> Self {
        Context::Text(text)
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Context::Structured(value)
    }
}

/// Extract up to [`MAX_KEYWORDS`] keywords from a context.
///
/// Lowercases, strips non-word characters, drops tokens of length <= 3
/// and stop words, then keeps the most frequent tokens. Ordering is by
/// descending frequency with first-seen breaking ties, so extraction is
/// deterministic for a fixed context.
pub fn extract_keywords(context: &Context) -> Vec<String> {
    let text = context.as_text();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for token in tokenize(&text) {
        if token.len() < MIN_KEYWORD_LEN || is_stop_word(&token) {
            continue;
        }
        let entry = counts.entry(token.clone()).or_insert(0);
        if *entry == 0 {
            order.push(token);
        }
        *entry += 1;
    }

    // Stable sort keeps first-seen order within equal frequencies.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(MAX_KEYWORDS);
    order
}
