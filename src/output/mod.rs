//! Output module for the JSON envelopes printed by the CLI
//!
//! Every command prints exactly one JSON document to stdout:
//! - `links` prints a [`LinksResponse`]
//! - `articles` prints an [`ArticlesResponse`]
//! - `article` prints the bare [`Article`]
//! - any failure prints an [`ErrorResponse`]

use crate::article::Article;
use crate::crawler::CrawlOutcome;
use serde::Serialize;
use std::io::Write;

const STATUS_OK: &str = "ok";
const STATUS_ERROR: &str = "error";

/// Result of a link listing
#[derive(Debug, Clone, Serialize)]
pub struct LinksResponse {
    pub status: &'static str,
    pub count: usize,
    pub links: Vec<String>,
}

impl LinksResponse {
    pub fn new(links: Vec<String>) -> Self {
        Self {
            status: STATUS_OK,
            count: links.len(),
            links,
        }
    }
}

/// Result of an article crawl
#[derive(Debug, Clone, Serialize)]
pub struct ArticlesResponse {
    pub status: &'static str,
    pub count: usize,
    pub total: usize,
    pub offset: usize,
    pub items: Vec<Article>,
}

impl ArticlesResponse {
    pub fn new(outcome: CrawlOutcome, offset: usize) -> Self {
        Self {
            status: STATUS_OK,
            count: outcome.articles.len(),
            total: outcome.total_candidates,
            offset,
            items: outcome.articles,
        }
    }
}

/// Failure report
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            message: message.into(),
        }
    }
}

/// Writes `value` as pretty-printed JSON followed by a newline
pub fn write_json<T: Serialize>(mut out: impl Write, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}
