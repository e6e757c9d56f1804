//! Phrase normalization and keyword helpers for textual matching

use std::collections::HashSet;

/// Characters of context kept on each side of a snippet
const SNIPPET_CONTEXT: usize = 40;

/// Words too common to identify a qualifier on their own
pub const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "among", "analysis", "and", "based", "before", "between", "both",
    "data", "during", "each", "from", "group", "have", "into", "more", "only", "other",
    "over", "patients", "per", "results", "some", "such", "than", "that", "their", "these",
    "this", "those", "through", "under", "were", "which", "while", "with", "within", "without",
];

/// Lowercase, collapse whitespace, and drop trailing punctuation.
///
/// This is the comparison form for citations, qualifiers and endpoints.
pub fn normalize_phrase(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'))
        .trim()
        .to_string()
}

/// Replace every run of whitespace with a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased alphanumeric words of `text`
pub fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Words that identify a phrase: long enough and not a stop word
pub fn significant_keywords(phrase: &str, min_len: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    phrase
        .split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= min_len && !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Snippet of `text` around the byte range `start..end`, trimmed to char boundaries
pub fn extract_snippet(text: &str, start: usize, end: usize) -> String {
    let start = floor_char_boundary(text, start.min(text.len()));
    let end = floor_char_boundary(text, end.min(text.len())).max(start);

    let before: String = text[..start]
        .chars()
        .rev()
        .take(SNIPPET_CONTEXT)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let after: String = text[end..].chars().take(SNIPPET_CONTEXT).collect();

    let snippet = collapse_whitespace(&format!("{}{}{}", before, &text[start..end], after));
    format!("...{}...", snippet)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
