//! Numeric and citation tokenizer for rendered variants
//!
//! [`TokenizedText::tokenize`] turns rendered markup into what the check
//! battery compares against: the distinct numbers a reader can see, the
//! citation markers present, and a normalized copy of the visible text for
//! phrase lookups.

pub mod citation;
pub mod markup;
pub mod numeric;

pub use citation::CitationToken;
pub use markup::VisibleText;
pub use numeric::{NumberMatch, NumericToken};

use crate::patterns::{collapse_whitespace, extract_snippet, normalize_phrase, words};
use crate::ComplianceError;
use std::collections::{BTreeSet, HashSet};

/// A number seen in the visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericOccurrence {
    pub token: NumericToken,
    /// Text as written in the visible text, e.g. "47.0 %"
    pub raw: String,
    pub percent: bool,
    visible_start: usize,
    visible_end: usize,
}

impl NumericOccurrence {
    /// Display form: canonical value plus a percent sign when one was written
    pub fn display(&self) -> String {
        if self.percent {
            format!("{}%", self.token)
        } else {
            self.token.to_string()
        }
    }
}

/// Tokenizer output for one rendered variant
#[derive(Debug, Clone)]
pub struct TokenizedText {
    visible: VisibleText,
    normalized: String,
    words: HashSet<String>,
    numbers: Vec<NumericOccurrence>,
    distinct_numbers: HashSet<NumericToken>,
    citations: BTreeSet<CitationToken>,
}

impl TokenizedText {
    pub fn tokenize(markup: &str) -> Result<Self, ComplianceError> {
        let visible = VisibleText::parse(markup)?;
        let text = visible.as_str();

        let mut citations = BTreeSet::new();
        for sup in visible.superscripts() {
            citations.extend(citation::expand_marker(sup));
        }

        let markers = citation::find_bracket_markers(text);
        for marker in &markers {
            citations.extend(marker.tokens.iter().cloned());
        }

        // Numbers inside reference markers are references, not data
        let numbers: Vec<NumericOccurrence> = numeric::find_numbers(text)
            .into_iter()
            .filter(|m| !markers.iter().any(|mk| m.start < mk.end && mk.start < m.end))
            .map(|m| NumericOccurrence {
                token: m.token,
                raw: m.raw,
                percent: m.percent,
                visible_start: m.start,
                visible_end: m.end,
            })
            .collect();

        let distinct_numbers = numbers.iter().map(|n| n.token.clone()).collect();
        let normalized = collapse_whitespace(&text.to_lowercase());
        let words = words(text);

        Ok(TokenizedText {
            visible,
            normalized,
            words,
            numbers,
            distinct_numbers,
            citations,
        })
    }

    pub fn visible_text(&self) -> &str {
        self.visible.as_str()
    }

    /// Every numeric occurrence, in order of appearance
    pub fn numbers(&self) -> &[NumericOccurrence] {
        &self.numbers
    }

    /// First occurrence of each distinct number, in order of appearance
    pub fn distinct_numbers(&self) -> impl Iterator<Item = &NumericOccurrence> {
        let mut seen = HashSet::new();
        self.numbers
            .iter()
            .filter(move |n| seen.insert(n.token.clone()))
    }

    pub fn numeric_tokens(&self) -> &HashSet<NumericToken> {
        &self.distinct_numbers
    }

    pub fn has_number(&self, token: &NumericToken) -> bool {
        self.distinct_numbers.contains(token)
    }

    pub fn occurrences_of<'a>(
        &'a self,
        token: &'a NumericToken,
    ) -> impl Iterator<Item = &'a NumericOccurrence> {
        self.numbers.iter().filter(move |n| &n.token == token)
    }

    pub fn citations(&self) -> &BTreeSet<CitationToken> {
        &self.citations
    }

    pub fn has_citation(&self, token: &CitationToken) -> bool {
        self.citations.contains(token)
    }

    /// Case- and whitespace-insensitive phrase lookup in the visible text.
    ///
    /// A phrase that starts or ends with a letter or digit must not run into
    /// a neighbouring word: `OS` is not found inside `dose`.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let phrase = normalize_phrase(phrase);
        if phrase.is_empty() {
            return false;
        }

        let starts_word = phrase.chars().next().is_some_and(char::is_alphanumeric);
        let ends_word = phrase.chars().next_back().is_some_and(char::is_alphanumeric);

        self.normalized.match_indices(&phrase).any(|(start, _)| {
            let before = self.normalized[..start].chars().next_back();
            let after = self.normalized[start + phrase.len()..].chars().next();
            !(starts_word && before.is_some_and(char::is_alphanumeric))
                && !(ends_word && after.is_some_and(char::is_alphanumeric))
        })
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Visible text surrounding a numeric occurrence
    pub fn snippet(&self, occurrence: &NumericOccurrence) -> String {
        extract_snippet(
            self.visible.as_str(),
            occurrence.visible_start,
            occurrence.visible_end,
        )
    }
}

/// Distinct numeric values written in a claim field
pub fn numbers_in(field: &str) -> Vec<NumberMatch> {
    numeric::numeric_values(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(markup: &str) -> TokenizedText {
        TokenizedText::tokenize(markup).unwrap()
    }

    #[test]
    fn test_formatting_variants_share_one_token() {
        let text = tokens("<p>47%</p><p>47.0 %</p><p>47%.</p>");
        assert_eq!(text.numeric_tokens().len(), 1);
        assert_eq!(text.numbers().len(), 3);
        assert!(text.has_number(&NumericToken::parse("47").unwrap()));
    }

    #[test]
    fn test_ignores_numbers_in_style_and_script() {
        let text = tokens(
            r#"<style>.x { width: 36.2%; }</style><div style="height: 45px">12%</div>
               <script>new Chart(el, { data: { datasets: [{ data: [99.9] }] } });</script>"#,
        );
        let values: Vec<_> = text.numeric_tokens().iter().map(|t| t.to_string()).collect();
        assert_eq!(values, vec!["12"]);
    }

    #[test]
    fn test_citation_markers_are_not_numbers() {
        let text = tokens("<p>36.2%<sup>1</sup> and 23.0% [2, 3]</p>");
        let values: HashSet<_> = text.numeric_tokens().iter().map(|t| t.to_string()).collect();
        assert_eq!(values, HashSet::from(["36.2".to_string(), "23".to_string()]));

        let refs: Vec<u32> = text.citations().iter().map(CitationToken::number).collect();
        assert_eq!(refs, vec![1, 2, 3]);
    }

    #[test]
    fn test_occurrence_display_and_snippet() {
        let text = tokens("<h1>Results</h1><p>Rate: <b>70.0 %</b></p>");
        let first = text.distinct_numbers().next().unwrap();
        assert_eq!(first.display(), "70%");
        assert_eq!(first.raw, "70.0 %");
        assert!(text.snippet(first).contains("Rate: 70.0 %"));
    }

    #[test]
    fn test_named_entities_decode_before_matching() {
        let text = tokens("<p>68% achieved SALT50 (M&uuml;ller K, et al. JAAD 2023)</p>");
        assert!(text.contains_phrase("Müller K, et al. JAAD 2023"));
    }

    #[test]
    fn test_phrase_lookup_is_case_and_space_insensitive() {
        let text = tokens("<p>POST   HOC\nanalysis; SALT &le;20</p>");
        assert!(text.contains_phrase("post hoc analysis"));
        assert!(text.contains_phrase("SALT ≤20"));
        assert!(text.contains_phrase("Post hoc analysis."));
        assert!(!text.contains_phrase(""));
        assert!(text.contains_word("Analysis"));
    }

    #[test]
    fn test_phrase_lookup_respects_word_boundaries() {
        let text = tokens("<p>Median dose 50 mg; EASI-75 at week 16 (OS data pending)</p>");
        assert!(text.contains_phrase("OS"));
        assert!(text.contains_phrase("EASI-75"));
        assert!(!text.contains_phrase("EASI-7"));
        assert!(!text.contains_phrase("eek 16"));

        let text = tokens("<p>Median dose 50 mg</p>");
        assert!(!text.contains_phrase("OS"));
    }

    #[test]
    fn test_numbers_in_claim_field() {
        let values = numbers_in("36.2% (95% CI 30.1–42.5)");
        let tokens: Vec<_> = values.iter().map(|m| m.token.to_string()).collect();
        assert_eq!(tokens, vec!["36.2", "95", "30.1", "42.5"]);
    }
}
