use crate::crawler::PageCap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Upper bound for the pause between requests, from config or command line
pub const MAX_DELAY_MS: u64 = 60_000;

/// Default site the built-in selector tables were written against
pub const DEFAULT_BASE_URL: &str = "https://www.econostream-media.com";

/// Main configuration structure for News-Harvest
///
/// Every section is optional; a missing section falls back to the defaults
/// for the Econostream news index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub transport: TransportSettings,
    pub selectors: SelectorConfig,
}

/// Site identity and canonical article URL shape
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme + host of the site, without a trailing slash
    pub base_url: String,

    /// Path of the news index section (also the pagination URL prefix)
    pub section_path: String,

    /// Path prefix shared by every canonical article URL
    pub article_prefix: String,

    /// Filename suffix shared by every canonical article URL
    pub article_suffix: String,

    /// Brand name that appears in the dateline, e.g. `PARIS (Econostream) –`
    pub brand: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            section_path: "/news".to_string(),
            article_prefix: "/news/".to_string(),
            article_suffix: ".html".to_string(),
            brand: "Econostream".to_string(),
        }
    }
}

impl SiteConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// First index page of the news section
    pub fn start_url(&self) -> String {
        format!("{}{}", self.base(), self.section_path)
    }

    /// Prefix every accepted next-page URL must start with
    pub fn section_prefix(&self) -> String {
        self.start_url()
    }

    /// Returns true if `url` has the site's canonical article shape
    pub fn is_article_url(&self, url: &str) -> bool {
        url.strip_prefix(self.base())
            .is_some_and(|path| path.starts_with(&self.article_prefix))
            && url.ends_with(&self.article_suffix)
    }
}

/// Crawl pacing and pagination bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum index pages to visit; absent or 0 means follow every next link
    pub max_pages: Option<u32>,

    /// Pause between consecutive requests (milliseconds)
    pub delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: Some(1),
            delay_ms: 400,
        }
    }
}

impl CrawlerConfig {
    pub fn page_cap(&self) -> PageCap {
        PageCap::from(self.max_pages)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Raw transport settings as read from the config file
///
/// Converted into an immutable [`crate::crawler::TransportConfig`] before
/// the HTTP client is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransportSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: f64,

    /// Total attempts per request, first try included
    pub max_attempts: u32,

    /// Exponential backoff base in seconds
    pub backoff_factor: f64,

    /// Upper bound for any single retry pause, in seconds
    pub backoff_max_secs: f64,

    /// Status codes that trigger a retry
    pub retry_statuses: Vec<u16>,

    /// Request headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15.0,
            max_attempts: 3,
            backoff_factor: 0.6,
            backoff_max_secs: 120.0,
            retry_statuses: vec![429, 500, 502, 503, 504],
            headers: default_headers(),
        }
    }
}

/// Browser-like header set sent when the config does not override it
pub fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.8"),
        ("Cache-Control", "no-cache"),
        ("Pragma", "no-cache"),
        ("Connection", "keep-alive"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Site-specific selector and pattern tables
///
/// The source site's markup is the parser's only protocol, so every
/// selector the parsers rely on lives here rather than in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Article teaser anchors on an index page
    pub list_anchor: String,

    /// Pagination controls inside the navigation landmark
    pub next_page: String,

    /// Visible text that marks a forward pagination control
    pub next_text: String,

    /// Query marker that identifies a pagination href
    pub next_offset_marker: String,

    /// Heading selectors tried in order for the title
    pub title: Vec<String>,

    /// `(attribute, value)` pairs of meta tags holding a fallback title
    pub title_meta: Vec<(String, String)>,

    /// Paragraph selectors tried in order for the body
    pub body: Vec<String>,

    /// `(attribute, value)` pairs of meta tags holding the publish date
    pub published_meta: Vec<(String, String)>,

    /// Visible date heading inside the article
    pub visible_date: String,

    /// Free-text date pattern; capture group 1 is the date
    pub text_date_pattern: String,

    /// Byline pattern; capture group 1 is the author
    pub byline_pattern: String,

    /// Lead figure image
    pub image: String,

    /// Lead figure caption
    pub caption: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
            items
                .iter()
                .map(|(a, v)| (a.to_string(), v.to_string()))
                .collect()
        }

        Self {
            list_anchor: ".site-list .article h3 a[href]".to_string(),
            next_page: "nav a.button[href]".to_string(),
            next_text: "Next".to_string(),
            next_offset_marker: "offset=".to_string(),
            title: owned(&[
                "article h1",
                "article h2",
                ".article h1",
                ".article h2",
                "h1",
                "h2",
            ]),
            title_meta: pairs(&[("property", "og:title"), ("name", "twitter:title")]),
            body: owned(&[
                "article .content p",
                "article .entry-content p",
                "article .post-content p",
                "article p",
                ".article p",
                "div[itemprop='articleBody'] p",
            ]),
            published_meta: pairs(&[
                ("property", "article:published_time"),
                ("name", "article:published_time"),
                ("name", "pubdate"),
                ("name", "date"),
                ("itemprop", "datePublished"),
            ]),
            visible_date: "article h3, .article h3".to_string(),
            text_date_pattern: r"\b(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})\b".to_string(),
            byline_pattern: r"(?i)^\s*By\s+([^–—\-]+)\s+[–—\-]\s*".to_string(),
            image: "figure.article-image img".to_string(),
            caption: "figcaption.article-image-caption".to_string(),
        }
    }
}
