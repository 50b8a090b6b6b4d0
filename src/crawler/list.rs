//! Index page parser
//!
//! Extracts from one fetched index page:
//! - The article teaser links, in site order
//! - The link to the next index page, if any
//!
//! Only anchors inside article-list items (under a heading) count as teasers;
//! navigation, advertising and footer anchors are ignored.

use crate::config::{compile_selector, Config};
use crate::url::abs_and_encode;
use crate::ConfigError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Links extracted from one index page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Absolute article links in page order, without in-page duplicates
    pub links: Vec<String>,

    /// Link to the following index page
    pub next: Option<String>,
}

/// Parser for news index pages, built from the configured selector tables
#[derive(Debug, Clone)]
pub struct ListPageParser {
    anchor: Selector,
    next_control: Selector,
    next_text: String,
    offset_marker: String,
    section_prefix: String,
}

impl ListPageParser {
    /// Compiles the index page selectors from configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let selectors = &config.selectors;
        Ok(Self {
            anchor: compile_selector(&selectors.list_anchor)?,
            next_control: compile_selector(&selectors.next_page)?,
            next_text: selectors.next_text.clone(),
            offset_marker: selectors.next_offset_marker.clone(),
            section_prefix: config.site.section_prefix(),
        })
    }

    /// Parses an index page
    ///
    /// # Arguments
    ///
    /// * `html` - The index page markup
    /// * `page_url` - The URL the markup was fetched from, for resolving links
    ///
    /// # Example
    ///
    /// ```
    /// use news_harvest::config::Config;
    /// use news_harvest::crawler::ListPageParser;
    /// use url::Url;
    ///
    /// let parser = ListPageParser::from_config(&Config::default()).unwrap();
    /// let html = r#"<div class="site-list"><div class="article">
    ///     <h3><a href="/news/rates.html">Rates</a></h3></div></div>"#;
    /// let page_url = Url::parse("https://www.econostream-media.com/news").unwrap();
    /// let page = parser.parse(html, &page_url);
    /// assert_eq!(page.links, vec!["https://www.econostream-media.com/news/rates.html"]);
    /// assert_eq!(page.next, None);
    /// ```
    pub fn parse(&self, html: &str, page_url: &Url) -> ListPage {
        let document = Html::parse_document(html);

        ListPage {
            links: self.extract_links(&document, page_url),
            next: self.find_next(&document, page_url),
        }
    }

    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Some(url) = abs_and_encode(href, page_url) {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
        }

        links
    }

    /// First pagination control, in document order, that looks like a forward
    /// link and stays inside the news section
    fn find_next(&self, document: &Html, page_url: &Url) -> Option<String> {
        for element in document.select(&self.next_control) {
            let href = element.value().attr("href").unwrap_or_default();
            let text = element.text().collect::<String>();

            let forward = text.trim().contains(&self.next_text)
                || (!self.offset_marker.is_empty() && href.contains(&self.offset_marker));
            if !forward {
                continue;
            }

            match abs_and_encode(href, page_url) {
                Some(url) if url.starts_with(&self.section_prefix) => return Some(url),
                Some(url) => {
                    tracing::debug!("Ignoring pagination link outside section: {}", url);
                }
                None => {}
            }
        }

        None
    }
}
