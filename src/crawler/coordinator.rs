//! Crawl orchestration
//!
//! Ties the transport, the pagination crawler and the article parser
//! together. All requests of one invocation go through a single fetcher and
//! run strictly one after another.

use crate::article::{Article, ArticleParser};
use crate::config::{validate, Config};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher, TransportConfig};
use crate::crawler::list::ListPageParser;
use crate::crawler::paginator::{ListOptions, PageCap, Paginator};
use crate::ScrapeError;
use serde::Serialize;
use std::time::Duration;

/// Articles produced by a crawl, plus how many links were discovered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlOutcome {
    /// Parsed articles, in link order
    pub articles: Vec<Article>,

    /// Canonical links discovered before slicing
    pub total_candidates: usize,
}

/// Crawl coordinator for one invocation
pub struct Coordinator<F: PageFetcher> {
    config: Config,
    fetcher: F,
    list_parser: ListPageParser,
    article_parser: ArticleParser,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator with its own HTTP transport
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(ScrapeError)` - Invalid configuration or the client failed to build
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let transport = TransportConfig::from_settings(&config.transport)?;
        let fetcher = HttpFetcher::new(&transport)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator on top of an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, ScrapeError> {
        validate(&config)?;
        let list_parser = ListPageParser::from_config(&config)?;
        let article_parser = ArticleParser::from_config(&config)?;

        Ok(Self {
            config,
            fetcher,
            list_parser,
            article_parser,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lists canonical article links, starting at `start_url`
    pub async fn list_links(
        &self,
        start_url: &str,
        page_cap: PageCap,
        delay: Duration,
    ) -> Result<Vec<String>, ScrapeError> {
        self.list_links_with(start_url, &ListOptions::new(page_cap, delay))
            .await
    }

    /// Lists canonical article links with explicit options
    pub async fn list_links_with(
        &self,
        start_url: &str,
        options: &ListOptions,
    ) -> Result<Vec<String>, ScrapeError> {
        Paginator::new(&self.fetcher, &self.list_parser, &self.config.site)
            .collect(start_url, options)
            .await
    }

    /// Fetches one article page and parses it
    pub async fn fetch_and_parse(&self, url: &str) -> Result<Article, ScrapeError> {
        let html = self.fetcher.fetch_text(url).await?;
        let article = self.article_parser.parse(&html, url);
        tracing::debug!(
            "Parsed {}: title={:?}, {} words",
            url,
            article.title,
            article.word_count
        );
        Ok(article)
    }

    /// Lists links, slices them and fetches the selected articles
    ///
    /// # Arguments
    ///
    /// * `start_url` - First index page
    /// * `page_cap` - Maximum index pages to visit
    /// * `offset` - Number of leading links to skip
    /// * `limit` - Maximum number of articles to fetch; `None` fetches all
    /// * `delay` - Pause between consecutive requests
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Every selected article parsed, in link order
    /// * `Err(ScrapeError)` - The first failed request; nothing partial is returned
    pub async fn crawl_articles(
        &self,
        start_url: &str,
        page_cap: PageCap,
        offset: usize,
        limit: Option<usize>,
        delay: Duration,
    ) -> Result<CrawlOutcome, ScrapeError> {
        let links = self.list_links(start_url, page_cap, delay).await?;
        let total_candidates = links.len();

        let selected: Vec<&String> = links
            .iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        tracing::info!(
            "Fetching {} of {} article(s) (offset {})",
            selected.len(),
            total_candidates,
            offset
        );

        let mut articles = Vec::with_capacity(selected.len());
        for (i, url) in selected.into_iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.fetch_and_parse(url).await {
                Ok(article) => articles.push(article),
                Err(e) => {
                    tracing::error!("Article fetch failed, aborting crawl: {}", e);
                    return Err(e);
                }
            }
        }

        Ok(CrawlOutcome {
            articles,
            total_candidates,
        })
    }
}
