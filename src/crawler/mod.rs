//! Crawler module for index traversal and article fetching
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Index page parsing (teaser links and next-page detection)
//! - Pagination with page caps and cycle detection
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod list;
mod paginator;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{
    build_http_client, parse_retry_after, HttpFetcher, PageFetcher, RetryPolicy, TransportConfig,
};
pub use list::{ListPage, ListPageParser};
pub use paginator::{CrawlState, ListOptions, PageCap, Paginator};

use crate::article::Article;
use crate::config::Config;
use crate::ScrapeError;
use std::time::Duration;

/// Lists canonical article links from the news index
///
/// A fresh transport is created for the call and dropped when it returns.
///
/// # Arguments
///
/// * `config` - Site, transport and selector configuration
/// * `start_url` - First index page
/// * `page_cap` - Maximum index pages to visit
/// * `delay` - Pause between page fetches
///
/// # Example
///
/// ```no_run
/// use news_harvest::{list_links, Config, PageCap};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), news_harvest::ScrapeError> {
/// let config = Config::default();
/// let links = list_links(&config, &config.site.start_url(), PageCap::Limited(2), Duration::from_millis(400)).await?;
/// println!("{} links", links.len());
/// # Ok(())
/// # }
/// ```
pub async fn list_links(
    config: &Config,
    start_url: &str,
    page_cap: PageCap,
    delay: Duration,
) -> Result<Vec<String>, ScrapeError> {
    Coordinator::new(config.clone())?
        .list_links(start_url, page_cap, delay)
        .await
}

/// Fetches and parses a single article page
pub async fn fetch_and_parse(config: &Config, url: &str) -> Result<Article, ScrapeError> {
    Coordinator::new(config.clone())?.fetch_and_parse(url).await
}

/// Lists links, then fetches the `offset`/`limit` slice of them as articles
///
/// Aborts on the first failed request.
pub async fn crawl_articles(
    config: &Config,
    start_url: &str,
    page_cap: PageCap,
    offset: usize,
    limit: Option<usize>,
    delay: Duration,
) -> Result<CrawlOutcome, ScrapeError> {
    Coordinator::new(config.clone())?
        .crawl_articles(start_url, page_cap, offset, limit, delay)
        .await
}
