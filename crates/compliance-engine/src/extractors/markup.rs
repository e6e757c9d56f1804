//! Visible-text extraction from rendered markup
//!
//! Rendered variants are HTML pages with inline CSS and chart-library
//! configuration. The markup is parsed with `scraper` (html5ever), so entity
//! decoding and attribute quoting follow the HTML5 rules. Only text a reader
//! would actually see is kept: attributes, comments and the contents of
//! `<script>`, `<style>`, `<noscript>` and `<template>` are dropped.

use crate::ComplianceError;
use scraper::{ElementRef, Html, Node};

/// Share of non-whitespace control characters above which input is treated as binary
const MAX_CONTROL_RATIO: f64 = 0.05;

/// Elements whose content is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Text as displayed, plus the reference markers found in superscripts
#[derive(Debug, Clone, Default)]
pub struct VisibleText {
    text: String,
    superscripts: Vec<String>,
}

enum Pending<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Break,
}

impl VisibleText {
    /// Extract visible text from rendered markup.
    ///
    /// Fails only when the input cannot be treated as text at all: NUL bytes,
    /// a high share of control characters, or a comment or hidden block that
    /// never closes (its contents would otherwise swallow the rest of the page).
    pub fn parse(markup: &str) -> Result<Self, ComplianceError> {
        check_is_text(markup)?;
        check_blocks_closed(markup)?;

        let document = Html::parse_document(markup);
        let mut out = VisibleText {
            text: String::with_capacity(markup.len()),
            superscripts: Vec::new(),
        };

        // Explicit stack: nesting depth is attacker-controlled
        let mut stack = vec![Pending::Element(document.root_element())];
        while let Some(item) = stack.pop() {
            match item {
                Pending::Text(text) => out.push_text(text),
                Pending::Break => out.text.push(' '),
                Pending::Element(element) => {
                    let name = element.value().name();
                    if HIDDEN_ELEMENTS.contains(&name) {
                        continue;
                    }
                    out.text.push(' ');

                    if name == "sup" {
                        let content: String = element.text().collect();
                        if is_reference_marker(&content) {
                            out.superscripts.push(content.trim().to_string());
                            continue;
                        }
                    }

                    stack.push(Pending::Break);
                    let children: Vec<_> = element.children().collect();
                    for child in children.into_iter().rev() {
                        match child.value() {
                            Node::Text(text) => stack.push(Pending::Text(&**text)),
                            Node::Element(_) => {
                                if let Some(el) = ElementRef::wrap(child) {
                                    stack.push(Pending::Element(el));
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        Ok(out)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Reference superscript contents, e.g. `1,2` for `<sup>1,2</sup>`
    pub fn superscripts(&self) -> &[String] {
        &self.superscripts
    }

    fn push_text(&mut self, text: &str) {
        // Non-breaking spaces read as ordinary spaces
        self.text
            .extend(text.chars().map(|c| if c == '\u{a0}' { ' ' } else { c }));
    }
}

/// Superscripts holding only reference numbers, e.g. `1`, `1,2`, `3–5`
fn is_reference_marker(inner: &str) -> bool {
    let inner = inner.trim();
    !inner.is_empty()
        && inner.chars().any(|c| c.is_ascii_digit())
        && inner
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '-' | '–' | ' '))
}

fn check_is_text(markup: &str) -> Result<(), ComplianceError> {
    if markup.contains('\0') {
        return Err(ComplianceError::MalformedInput(
            "rendered text contains NUL bytes".to_string(),
        ));
    }

    let total = markup.chars().count();
    if total == 0 {
        return Ok(());
    }

    let control = markup
        .chars()
        .filter(|c| c.is_control() && !c.is_whitespace())
        .count();
    if control as f64 / total as f64 > MAX_CONTROL_RATIO {
        return Err(ComplianceError::MalformedInput(format!(
            "rendered text looks binary ({} of {} characters are control characters)",
            control, total
        )));
    }

    Ok(())
}

/// Reject comments and hidden raw-text blocks that run to the end of input.
///
/// One forward pass over an ASCII-lowercased copy; tags are skipped with
/// quote awareness so `<` or `>` inside attribute values are not misread.
fn check_blocks_closed(markup: &str) -> Result<(), ComplianceError> {
    // ASCII lowercasing keeps byte offsets stable
    let lowered = markup.to_ascii_lowercase();
    let bytes = lowered.as_bytes();

    let mut pos = 0;
    while let Some(found) = lowered[pos..].find('<') {
        let start = pos + found;
        let rest = &lowered[start..];

        if rest.starts_with("<!--") {
            pos = match rest[4..].find("-->") {
                Some(end) => start + 4 + end + 3,
                None => return Err(unterminated("comment", start)),
            };
            continue;
        }

        let name_len = rest[1..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        if name_len == 0 || !bytes[start + 1].is_ascii_alphabetic() {
            pos = start + 1;
            continue;
        }

        let name = &rest[1..1 + name_len];
        let tag_end = skip_tag(bytes, start + 1 + name_len);
        pos = tag_end;

        if HIDDEN_ELEMENTS.contains(&name) {
            pos = match find_closing_tag(&lowered, tag_end, name) {
                Some(end) => end,
                None => return Err(unterminated(name, start)),
            };
        }
    }

    Ok(())
}

/// Offset just past the `>` that ends a tag, ignoring `>` inside quoted values
fn skip_tag(bytes: &[u8], mut i: usize) -> usize {
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return i + 1,
            None => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Offset just past `</name ...>` at or after `from` in already-lowercased text
fn find_closing_tag(lowered: &str, from: usize, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    let mut search_from = from;
    while let Some(pos) = lowered[search_from..].find(&needle) {
        let after_name = search_from + pos + needle.len();
        let boundary = lowered[after_name..].chars().next();
        if matches!(boundary, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            return Some(skip_tag(lowered.as_bytes(), after_name));
        }
        search_from = after_name;
    }
    None
}

fn unterminated(what: &str, offset: usize) -> ComplianceError {
    ComplianceError::MalformedInput(format!("unterminated {} at byte {}", what, offset))
}
