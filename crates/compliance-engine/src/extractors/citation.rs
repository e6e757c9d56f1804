// Citation reference markers: "[1]", "[2, 3]", "[4–6]", "<sup>1</sup>"
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranges wider than this are treated as typos rather than expanded
const MAX_RANGE_SPAN: u32 = 50;

lazy_static! {
    static ref BRACKET_MARKER_RE: Regex =
        Regex::new(r"\[\s*(\d+(?:\s*[,–-]\s*\d+)*)\s*\]").unwrap();
    static ref MARKER_BODY_RE: Regex = Regex::new(r"^\d+(?:\s*[,–-]\s*\d+)*$").unwrap();
}

/// A single reference number as it appears in a marker
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationToken(u32);

impl CitationToken {
    pub fn number(&self) -> u32 {
        self.0
    }

    /// Interpret a claim's citation field as a reference marker, when it is one.
    ///
    /// `"[3]"`, `"3"`, `"[1, 2]"` and `"1–3"` are markers; a literal reference
    /// such as `"King B, et al. Lancet 2023"` is not.
    pub fn parse_reference(citation: &str) -> Option<Vec<CitationToken>> {
        let body = citation.trim();
        let body = body
            .strip_prefix('[')
            .and_then(|b| b.strip_suffix(']'))
            .unwrap_or(body)
            .trim();

        if !MARKER_BODY_RE.is_match(body) {
            return None;
        }
        let tokens = expand_marker(body);
        if tokens.is_empty() {
            None
        } else {
            Some(tokens)
        }
    }
}

impl fmt::Display for CitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// A bracketed marker found in visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub tokens: Vec<CitationToken>,
    pub start: usize,
    pub end: usize,
}

/// Find bracketed reference markers in visible text
pub fn find_bracket_markers(text: &str) -> Vec<MarkerMatch> {
    BRACKET_MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(MarkerMatch {
                tokens: expand_marker(caps.get(1)?.as_str()),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Expand "1, 3–5" into [1, 3, 4, 5]
pub fn expand_marker(body: &str) -> Vec<CitationToken> {
    let mut tokens = Vec::new();

    for part in body.split(',') {
        let part = part.trim();
        let bounds: Vec<&str> = part
            .split(|c: char| c == '-' || c == '–')
            .map(str::trim)
            .collect();

        match bounds.as_slice() {
            [single] => {
                if let Ok(n) = single.parse::<u32>() {
                    tokens.push(CitationToken(n));
                }
            }
            [from, to] => {
                let (Ok(from), Ok(to)) = (from.parse::<u32>(), to.parse::<u32>()) else {
                    continue;
                };
                if from <= to && to - from <= MAX_RANGE_SPAN {
                    tokens.extend((from..=to).map(CitationToken));
                } else {
                    tokens.push(CitationToken(from));
                    tokens.push(CitationToken(to));
                }
            }
            _ => {}
        }
    }

    tokens
}
