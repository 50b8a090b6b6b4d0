//! Extraction strategies
//!
//! Each article field is filled by an [`ExtractionChain`]: an ordered list of
//! strategies where the first one producing a value wins. Strategies never
//! fail; a strategy that finds nothing yields `None` and the chain moves on.

use crate::article::date::PublishedDate;
use crate::article::text::{clean_text, element_text, element_text_joined, visible_text};
use crate::url::abs_and_encode;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// A parsed article document plus the URL it was fetched from
pub struct ArticlePage<'a> {
    pub document: &'a Html,
    pub base: Option<&'a Url>,
}

/// One way of extracting a field from an article page
pub trait Strategy: Send + Sync {
    type Output;

    /// Short label used in trace logs
    fn name(&self) -> &str;

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<Self::Output>;
}

/// Ordered fallback list of strategies for one field
pub struct ExtractionChain<T> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<Output = T>>>,
}

impl<T> ExtractionChain<T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn push(mut self, strategy: impl Strategy<Output = T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Runs the strategies in order and returns the first value found
    pub fn run(&self, page: &ArticlePage<'_>) -> Option<T> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.attempt(page) {
                tracing::trace!("{}: matched by {}", self.field, strategy.name());
                return Some(value);
            }
        }

        tracing::debug!("{}: no strategy matched", self.field);
        None
    }
}

/// Cleaned text of the first element matching a selector
pub struct SelectorText {
    label: String,
    selector: Selector,
}

impl SelectorText {
    pub fn new(label: &str, selector: Selector) -> Self {
        Self {
            label: label.to_string(),
            selector,
        }
    }
}

impl Strategy for SelectorText {
    type Output = String;

    fn name(&self) -> &str {
        &self.label
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<String> {
        let element = page.document.select(&self.selector).next()?;
        non_empty(clean_text(&element_text(&element)))
    }
}

/// `content` of the first meta tag matching a selector
pub struct MetaContent {
    label: String,
    selector: Selector,
}

impl MetaContent {
    pub fn new(label: &str, selector: Selector) -> Self {
        Self {
            label: label.to_string(),
            selector,
        }
    }
}

impl Strategy for MetaContent {
    type Output = String;

    fn name(&self) -> &str {
        &self.label
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<String> {
        let element = page.document.select(&self.selector).next()?;
        non_empty(clean_text(element.value().attr("content")?))
    }
}

/// The document `<title>`
pub struct DocumentTitle {
    selector: Selector,
}

impl DocumentTitle {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }
}

impl Strategy for DocumentTitle {
    type Output = String;

    fn name(&self) -> &str {
        "title"
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<String> {
        let element = page.document.select(&self.selector).next()?;
        non_empty(clean_text(&element_text(&element)))
    }
}

/// Publish date from a meta tag's `content` (or `value`) attribute
pub struct MetaPublished {
    label: String,
    selector: Selector,
}

impl MetaPublished {
    pub fn new(label: &str, selector: Selector) -> Self {
        Self {
            label: label.to_string(),
            selector,
        }
    }
}

impl Strategy for MetaPublished {
    type Output = PublishedDate;

    fn name(&self) -> &str {
        &self.label
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<PublishedDate> {
        let element = page.document.select(&self.selector).next()?;
        let value = element
            .value()
            .attr("content")
            .or_else(|| element.value().attr("value"))?;
        if value.trim().is_empty() {
            return None;
        }
        Some(PublishedDate::from_meta(value))
    }
}

/// Publish date from a visible heading inside the article
pub struct VisibleDate {
    selector: Selector,
}

impl VisibleDate {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }
}

impl Strategy for VisibleDate {
    type Output = PublishedDate;

    fn name(&self) -> &str {
        "visible-date"
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<PublishedDate> {
        let element = page.document.select(&self.selector).next()?;
        let text = non_empty(clean_text(&element_text(&element)))?;
        Some(PublishedDate::from_visible(&text))
    }
}

/// Publish date found by scanning the page's visible text
pub struct TextScanDate {
    pattern: Regex,
}

impl TextScanDate {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Strategy for TextScanDate {
    type Output = PublishedDate;

    fn name(&self) -> &str {
        "text-scan"
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<PublishedDate> {
        let text = visible_text(page.document);
        let found = self.pattern.captures(&text)?.get(1)?;
        Some(PublishedDate::from_visible(found.as_str()))
    }
}

/// Every paragraph matching a selector, cleaned, empties dropped
///
/// Matches only when at least one non-empty paragraph remains.
pub struct BodyParagraphs {
    label: String,
    selector: Selector,
}

impl BodyParagraphs {
    pub fn new(label: &str, selector: Selector) -> Self {
        Self {
            label: label.to_string(),
            selector,
        }
    }
}

impl Strategy for BodyParagraphs {
    type Output = Vec<String>;

    fn name(&self) -> &str {
        &self.label
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<Vec<String>> {
        let paragraphs: Vec<String> = page
            .document
            .select(&self.selector)
            .map(|p| clean_text(&element_text_joined(&p)))
            .filter(|p| !p.is_empty())
            .collect();

        (!paragraphs.is_empty()).then_some(paragraphs)
    }
}

/// Lead figure image `src`, resolved against the article URL and encoded
pub struct FigureImage {
    selector: Selector,
}

impl FigureImage {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }
}

impl Strategy for FigureImage {
    type Output = String;

    fn name(&self) -> &str {
        "figure-image"
    }

    fn attempt(&self, page: &ArticlePage<'_>) -> Option<String> {
        let element = page.document.select(&self.selector).next()?;
        let src = element.value().attr("src")?;
        abs_and_encode(src, page.base?)
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
