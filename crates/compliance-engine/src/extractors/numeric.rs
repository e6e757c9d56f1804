// Numeric token extraction and normalization for compliance validation
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    /// Integers (optionally with thousands separators), decimals, and an optional
    /// percent sign separated by whitespace. The leading `\b` keeps digits glued to
    /// letters ("SALT50") out.
    static ref NUMBER_RE: Regex =
        Regex::new(r"\b(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d+))?(?:\s*(%))?").unwrap();
}

/// A number compared by value, independent of how it was formatted.
///
/// `12%`, `12.0%`, `12 %` and `012` all become `12`; `36.2` and `36.25` stay
/// distinct. Percent signs are formatting: the token carries only the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericToken(String);

impl NumericToken {
    /// Normalize integer and fractional digit groups into a canonical value
    pub fn from_parts(integer: &str, fraction: Option<&str>) -> Self {
        let digits: String = integer.chars().filter(|c| c.is_ascii_digit()).collect();
        let trimmed = digits.trim_start_matches('0');
        let integer = if trimmed.is_empty() { "0" } else { trimmed };

        let fraction = fraction.unwrap_or("").trim_end_matches('0');
        if fraction.is_empty() {
            NumericToken(integer.to_string())
        } else {
            NumericToken(format!("{}.{}", integer, fraction))
        }
    }

    /// Parse a single number such as "47", "47.0 %" or "1,200". Returns `None`
    /// when the text is not exactly one number.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text
            .trim()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'));
        let caps = NUMBER_RE.captures(text)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != text.len() {
            return None;
        }
        Some(Self::from_parts(
            caps.get(1)?.as_str(),
            caps.get(2).map(|m| m.as_str()),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NumericToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One number found in a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberMatch {
    pub token: NumericToken,
    /// Text as written, e.g. "47.0 %"
    pub raw: String,
    pub percent: bool,
    pub start: usize,
    pub end: usize,
}

impl NumberMatch {
    /// Display form used in messages: value plus percent sign when one was written
    pub fn display(&self) -> String {
        if self.percent {
            format!("{}%", self.token)
        } else {
            self.token.to_string()
        }
    }
}

/// Find every number in `text`, in order of appearance
pub fn find_numbers(text: &str) -> Vec<NumberMatch> {
    NUMBER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(NumberMatch {
                token: NumericToken::from_parts(
                    caps.get(1)?.as_str(),
                    caps.get(2).map(|m| m.as_str()),
                ),
                raw: whole.as_str().to_string(),
                percent: caps.get(3).is_some(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Distinct numeric values in `text`, in order of first appearance
pub fn numeric_values(text: &str) -> Vec<NumberMatch> {
    let mut seen = std::collections::HashSet::new();
    find_numbers(text)
        .into_iter()
        .filter(|m| seen.insert(m.token.clone()))
        .collect()
}
