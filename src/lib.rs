//! News-Harvest: a pagination-aware news index crawler
//!
//! This crate walks a news site's index pages, collects canonical article links,
//! and turns each article page into a structured [`Article`] record using a
//! cascade of selector strategies that tolerates missing or inconsistent markup.

pub mod article;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for News-Harvest operations
///
/// Only transport and configuration problems are errors. Missing article
/// fields, unparseable dates and malformed links degrade to absent values
/// and never surface here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP {status} for {url} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid start URL: {0}")]
    InvalidUrl(String),
}

impl ScrapeError {
    /// Returns the URL that caused a transport failure, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Status { url, .. } | Self::Http { url, .. } | Self::Timeout { url } => {
                Some(url.as_str())
            }
            Self::InvalidUrl(url) => Some(url.as_str()),
            _ => None,
        }
    }

    /// Returns true for failures raised while talking to the remote site
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Http { .. } | Self::Timeout { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for News-Harvest operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{Article, ArticleParser, PublishedDate};
pub use config::Config;
pub use crawler::{crawl_articles, fetch_and_parse, list_links, CrawlOutcome, PageCap};
pub use crate::url::{abs_and_encode, encode_url};
