//! In-memory transport and markup builders for crawler unit tests

use crate::crawler::fetcher::PageFetcher;
use crate::ScrapeError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const BASE: &str = "https://www.econostream-media.com";

/// Serves canned bodies or statuses by exact URL and records every request
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Result<String, u16>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ScrapeError::Status {
                url: url.to_string(),
                status: *status,
                attempts: 1,
            }),
            None => Err(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
                attempts: 1,
            }),
        }
    }
}

/// Index page markup with the given teaser hrefs and optional next button
pub fn index_page(hrefs: &[&str], next: Option<&str>) -> String {
    let teasers: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<div class="article"><h3><a href="{}">Headline</a></h3></div>"#,
                href
            )
        })
        .collect();
    let nav = next
        .map(|href| format!(r#"<a class="button" href="{}">Next</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body><div class="site-list">{}</div><nav>{}</nav></body></html>"#,
        teasers, nav
    )
}

/// Minimal article markup whose title is `title`
pub fn article_page(title: &str) -> String {
    format!(
        r#"<html><body><article><h1>{}</h1>
        <div class="content"><p>By Staff Writer – Frankfurt (Econostream) – Body text for {}.</p></div>
        </article></body></html>"#,
        title, title
    )
}
