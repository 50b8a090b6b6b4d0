//! Article page extraction
//!
//! Turns one article page into an [`Article`] record. Every field is
//! extracted independently through its own strategy chain, so a missing or
//! malformed part of the markup only ever leaves that one field absent.
//!
//! | Field | Cascade |
//! |-------|---------|
//! | title | article headings, generic headings, `og:title` / `twitter:title`, `<title>` |
//! | published | date meta tags, visible date heading, free-text date scan |
//! | body | configured paragraph selectors, then every `<p>` |
//! | image | lead figure `<img src>` |
//! | caption | lead figure caption |
//!
//! Author and location come from the byline at the start of the body text.

mod date;
mod strategy;
mod text;

pub use date::PublishedDate;
pub use strategy::{ArticlePage, ExtractionChain, Strategy};
pub use text::{clean_text, Byline, BylineMatcher};

use crate::config::{compile_selector, meta_selector, Config};
use crate::ConfigError;
use regex::Regex;
use scraper::Html;
use serde::Serialize;
use strategy::{
    BodyParagraphs, DocumentTitle, FigureImage, MetaContent, MetaPublished, SelectorText,
    TextScanDate, VisibleDate,
};
use url::Url;

/// A structured article record
///
/// Only `url` and `word_count` are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub published: Option<PublishedDate>,
    pub author: Option<String>,
    pub location: Option<String>,
    pub lede: Option<String>,
    pub text: Option<String>,
    pub word_count: usize,
    pub image: Option<String>,
    pub caption: Option<String>,
}

/// Article page parser built from the configured selector tables
pub struct ArticleParser {
    title: ExtractionChain<String>,
    published: ExtractionChain<PublishedDate>,
    body: ExtractionChain<Vec<String>>,
    image: ExtractionChain<String>,
    caption: ExtractionChain<String>,
    byline: BylineMatcher,
}

impl ArticleParser {
    /// Compiles every selector and pattern the parser needs
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a selector or pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let selectors = &config.selectors;

        let mut title = ExtractionChain::new("title");
        for css in &selectors.title {
            title = title.push(SelectorText::new(css, compile_selector(css)?));
        }
        for (attr, value) in &selectors.title_meta {
            let css = meta_selector(attr, value);
            title = title.push(MetaContent::new(value, compile_selector(&css)?));
        }
        title = title.push(DocumentTitle::new(compile_selector("title")?));

        let mut published = ExtractionChain::new("published");
        for (attr, value) in &selectors.published_meta {
            let css = meta_selector(attr, value);
            published = published.push(MetaPublished::new(&css, compile_selector(&css)?));
        }
        let text_date = Regex::new(&selectors.text_date_pattern)
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        published = published
            .push(VisibleDate::new(compile_selector(&selectors.visible_date)?))
            .push(TextScanDate::new(text_date));

        let mut body = ExtractionChain::new("body");
        for css in &selectors.body {
            body = body.push(BodyParagraphs::new(css, compile_selector(css)?));
        }
        body = body.push(BodyParagraphs::new("p", compile_selector("p")?));

        let image = ExtractionChain::new("image")
            .push(FigureImage::new(compile_selector(&selectors.image)?));
        let caption = ExtractionChain::new("caption").push(SelectorText::new(
            &selectors.caption,
            compile_selector(&selectors.caption)?,
        ));

        Ok(Self {
            title,
            published,
            body,
            image,
            caption,
            byline: BylineMatcher::new(&selectors.byline_pattern, &config.site.brand)?,
        })
    }

    /// Parses an article page fetched from `url`
    ///
    /// Never fails: whatever cannot be found is left as `None`.
    pub fn parse(&self, html: &str, url: &str) -> Article {
        let document = Html::parse_document(html);
        let base = Url::parse(url).ok();
        let page = ArticlePage {
            document: &document,
            base: base.as_ref(),
        };

        let paragraphs = self.body.run(&page).unwrap_or_default();
        let lede = text::select_lede(&paragraphs);
        let body_text = text::join_paragraphs(&paragraphs);
        let word_count = body_text.as_deref().map(text::word_count).unwrap_or(0);
        let byline = self
            .byline
            .extract(&text::byline_window(lede.as_deref(), &paragraphs));

        Article {
            url: url.to_string(),
            title: self.title.run(&page),
            published: self.published.run(&page),
            author: byline.author,
            location: byline.location,
            lede,
            text: body_text,
            word_count,
            image: self.image.run(&page),
            caption: self.caption.run(&page),
        }
    }
}
