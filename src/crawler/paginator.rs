//! Pagination crawler
//!
//! Walks index pages by following next-page links and accumulates the
//! canonical article links in strict site-traversal order:
//! - Page 1 links come before page 2 links; intra-page order is preserved
//! - A link seen earlier is dropped; the first occurrence wins
//! - A failed page fetch aborts the crawl, so link sets are never silently truncated

use crate::config::SiteConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::list::ListPageParser;
use crate::ScrapeError;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Upper bound on the number of index pages visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCap {
    /// Stop after this many pages; `Limited(0)` behaves like `Unbounded`
    Limited(u32),
    /// Follow next-page links until they run out
    Unbounded,
}

impl PageCap {
    /// Returns true once `pages` pages have been fetched under this cap
    pub fn reached(&self, pages: u32) -> bool {
        match self {
            Self::Limited(0) | Self::Unbounded => false,
            Self::Limited(max) => pages >= *max,
        }
    }
}

/// `None` and `Some(0)` both mean no page limit
impl From<Option<u32>> for PageCap {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(0) | None => Self::Unbounded,
            Some(max) => Self::Limited(max),
        }
    }
}

/// Link bookkeeping for one crawl invocation
///
/// Created empty when the crawl starts and consumed when it returns.
#[derive(Debug, Default)]
pub struct CrawlState {
    seen: HashSet<String>,
    collected: Vec<String>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `link` if it has not been seen; returns true if it was new
    pub fn offer(&mut self, link: String) -> bool {
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.collected.push(link);
        true
    }

    pub fn len(&self) -> usize {
        self.collected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }

    /// Collected links in discovery order
    pub fn into_links(self) -> Vec<String> {
        self.collected
    }
}

/// Bounds and pacing for a link listing
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Maximum index pages to visit
    pub page_cap: PageCap,

    /// Pause between consecutive page fetches
    pub delay: Duration,

    /// Stop once this many links have been collected
    pub max_links: Option<usize>,
}

impl ListOptions {
    pub fn new(page_cap: PageCap, delay: Duration) -> Self {
        Self {
            page_cap,
            delay,
            max_links: None,
        }
    }

    pub fn with_max_links(mut self, max_links: Option<usize>) -> Self {
        self.max_links = max_links;
        self
    }
}

/// Drives the index page parser across successive pages
pub struct Paginator<'a, F: PageFetcher> {
    fetcher: &'a F,
    parser: &'a ListPageParser,
    site: &'a SiteConfig,
}

impl<'a, F: PageFetcher> Paginator<'a, F> {
    pub fn new(fetcher: &'a F, parser: &'a ListPageParser, site: &'a SiteConfig) -> Self {
        Self {
            fetcher,
            parser,
            site,
        }
    }

    /// Collects canonical article links starting from `start_url`
    ///
    /// # Stop Conditions
    ///
    /// 1. The page cap is reached
    /// 2. The page has no next-page link
    /// 3. The next-page link points at a page already fetched in this crawl
    /// 4. `max_links` links have been collected
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Ordered, de-duplicated article links
    /// * `Err(ScrapeError)` - A page fetch failed; no partial result is returned
    pub async fn collect(
        &self,
        start_url: &str,
        options: &ListOptions,
    ) -> Result<Vec<String>, ScrapeError> {
        let mut state = CrawlState::new();
        let mut fetched_pages = HashSet::new();
        let mut current = start_url.to_string();
        let mut pages = 0u32;

        loop {
            let page_url =
                Url::parse(&current).map_err(|_| ScrapeError::InvalidUrl(current.clone()))?;

            pages += 1;
            fetched_pages.insert(current.clone());
            let html = self.fetcher.fetch_text(&current).await?;
            let page = self.parser.parse(&html, &page_url);

            let found = page.links.len();
            let mut added = 0;
            for link in page.links {
                if !self.site.is_article_url(&link) {
                    tracing::debug!("Skipping non-article link: {}", link);
                    continue;
                }
                if state.offer(link) {
                    added += 1;
                }
            }

            tracing::info!(
                "Index page {} ({}): {} links, {} new, {} total",
                pages,
                current,
                found,
                added,
                state.len()
            );

            if options.max_links.is_some_and(|max| state.len() >= max) {
                tracing::debug!("Link limit reached after {} page(s)", pages);
                break;
            }

            if options.page_cap.reached(pages) {
                tracing::debug!("Page cap reached after {} page(s)", pages);
                break;
            }

            let Some(next) = page.next else {
                tracing::debug!("No next page after {}", current);
                break;
            };

            if fetched_pages.contains(&next) {
                tracing::warn!("Pagination loops back to {}, stopping", next);
                break;
            }

            if !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
            current = next;
        }

        let mut links = state.into_links();
        if let Some(max) = options.max_links {
            links.truncate(max);
        }
        Ok(links)
    }
}
