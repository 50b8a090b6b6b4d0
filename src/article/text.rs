//! Text helpers for article extraction
//!
//! Whitespace normalisation, paragraph selection and byline matching.

use crate::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static SPACE_BEFORE_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\n").unwrap());

/// Minimum length (in characters) of a paragraph that can serve as the lede
pub const LEDE_MIN_CHARS: usize = 20;

/// How much leading text is inspected for a byline
pub const BYLINE_WINDOW_CHARS: usize = 300;

/// Elements whose text is never visible on the page
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Normalises whitespace in extracted text
///
/// Non-breaking spaces become spaces, runs of spaces and tabs collapse to one
/// space, whitespace before a newline is dropped, and the ends are trimmed.
pub fn clean_text(text: &str) -> String {
    let text = text.replace('\u{a0}', " ");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
    text.trim().to_string()
}

/// All text of an element, concatenated as-is
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text nodes of an element, each trimmed, joined with single spaces
pub fn element_text_joined(element: &ElementRef<'_>) -> String {
    join_trimmed(element.text())
}

/// Every visible text node of the document, trimmed and joined with spaces
pub fn visible_text(document: &Html) -> String {
    let texts = document.root_element().descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| INVISIBLE_ELEMENTS.contains(&name));
        (!hidden).then_some(&**text)
    });
    join_trimmed(texts)
}

fn join_trimmed<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First paragraph of at least [`LEDE_MIN_CHARS`] characters, else the first one
pub fn select_lede(paragraphs: &[String]) -> Option<String> {
    paragraphs
        .iter()
        .find(|p| p.chars().count() >= LEDE_MIN_CHARS)
        .or_else(|| paragraphs.first())
        .cloned()
}

/// Paragraphs joined with a blank line, absent when there are none
pub fn join_paragraphs(paragraphs: &[String]) -> Option<String> {
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    }
}

/// Number of whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Text searched for the byline: the lede followed by the second paragraph
pub fn byline_window(lede: Option<&str>, paragraphs: &[String]) -> String {
    let second = paragraphs.get(1).map(String::as_str).unwrap_or_default();
    let joined = format!("{} {}", lede.unwrap_or_default(), second);
    joined.chars().take(BYLINE_WINDOW_CHARS).collect()
}

/// Author and dateline location found at the start of an article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Byline {
    pub author: Option<String>,
    pub location: Option<String>,
}

/// Matches `By <name> – <place> (<brand>) –` at the start of the article text
#[derive(Debug, Clone)]
pub struct BylineMatcher {
    byline: Regex,
    location: Regex,
}

impl BylineMatcher {
    /// Compiles the byline pattern and the brand-specific location pattern
    ///
    /// # Arguments
    ///
    /// * `byline_pattern` - Regex anchored at the start; group 1 is the author
    /// * `brand` - Site brand that follows the location, e.g. `Econostream`
    pub fn new(byline_pattern: &str, brand: &str) -> Result<Self, ConfigError> {
        let byline =
            Regex::new(byline_pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        let location = Regex::new(&format!(
            r"[–—\-]\s*([A-Za-zÀ-ÖØ-öø-ÿ.\s]+?)\s*\({}\)\s*[–—\-]",
            regex::escape(brand)
        ))
        .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        Ok(Self { byline, location })
    }

    /// Extracts author and location from the leading article text
    ///
    /// The location is only looked for when a byline matched.
    pub fn extract(&self, leading_text: &str) -> Byline {
        let Some(author) = capture(&self.byline, leading_text) else {
            return Byline::default();
        };

        Byline {
            author: Some(author),
            location: capture(&self.location, leading_text),
        }
    }
}

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
}
