//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients from an immutable [`TransportConfig`]
//! - GET requests returning the body as text
//! - Retry with exponential backoff for rate-limit and server errors
//! - Honouring `Retry-After` on retryable responses
//! - Error classification into [`ScrapeError`] variants

use crate::config::TransportSettings;
use crate::{ConfigError, ScrapeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;

/// Retry behaviour for page GETs
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return body |
/// | Status in `retry_statuses`, attempts left | Sleep, retry |
/// | Any other status | Fail with `ScrapeError::Status` |
/// | Timeout / connection error | Fail immediately |
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,

    /// Backoff base in seconds; the n-th retry waits `factor * 2^(n-1)`
    pub backoff_factor: f64,

    /// Upper bound for any single pause
    pub backoff_max: Duration,

    /// Status codes worth retrying
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 0.6,
            backoff_max: Duration::from_secs(120),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Returns true if a response with `status` on attempt number `attempt`
    /// (1-based) should be retried
    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        attempt < self.max_attempts && self.retry_statuses.contains(&status)
    }

    /// Computed pause before the `retry`-th retry (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs < 0.0 {
            return self.backoff_max;
        }
        secs_to_duration(secs).min(self.backoff_max)
    }

    /// Pause before the `retry`-th retry, preferring a server-provided delay
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(delay) => delay.min(self.backoff_max),
            None => self.backoff(retry),
        }
    }
}

/// Converts fractional seconds to a duration rounded to the nearest nanosecond
fn secs_to_duration(secs: f64) -> Duration {
    Duration::from_nanos((secs * 1e9).round() as u64)
}

/// Parses a `Retry-After` header value (delta-seconds or HTTP-date)
///
/// A date in the past yields a zero delay. Unparseable values yield `None`.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let when = DateTime::parse_from_rfc2822(value).ok()?;
    Some(
        (when.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}

/// Immutable transport configuration handed to [`HttpFetcher::new`]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// Headers sent with every request
    pub headers: HeaderMap,

    /// Retry policy for GET requests
    pub retry: RetryPolicy,
}

impl TransportConfig {
    /// Builds a transport configuration from validated settings
    pub fn from_settings(settings: &TransportSettings) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::Validation(format!("header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ConfigError::Validation(format!("header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        Ok(Self {
            timeout: secs_to_duration(settings.timeout_secs),
            headers,
            retry: RetryPolicy {
                max_attempts: settings.max_attempts,
                backoff_factor: settings.backoff_factor,
                backoff_max: secs_to_duration(settings.backoff_max_secs),
                retry_statuses: settings.retry_statuses.clone(),
            },
        })
    }
}

/// Source of page bodies
///
/// The paginator and orchestrator only see this seam, so tests can replace
/// the network with an in-memory fake.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body as text
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Builds an HTTP client from the transport configuration
///
/// # Example
///
/// ```no_run
/// use news_harvest::config::TransportSettings;
/// use news_harvest::crawler::{build_http_client, TransportConfig};
///
/// let config = TransportConfig::from_settings(&TransportSettings::default()).unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .default_headers(config.headers.clone())
        .timeout(config.timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying HTTP transport sharing one keep-alive client
///
/// One instance is created per crawl invocation and dropped when it returns.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher with its own connection pool
    pub fn new(config: &TransportConfig) -> Result<Self, ScrapeError> {
        let client = build_http_client(config).map_err(ScrapeError::ClientBuild)?;
        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// The retry policy this fetcher applies
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn get_with_retry(&self, url: &str) -> Result<String, ScrapeError> {
        let mut attempt = 1;

        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| classify_error(url, e))?;

            let status = response.status();
            if status.is_success() {
                tracing::debug!("GET {} -> {} (attempt {})", url, status, attempt);
                return response.text().await.map_err(|e| classify_error(url, e));
            }

            if self.retry.should_retry(status.as_u16(), attempt) {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| parse_retry_after(v, Utc::now()));
                let pause = self.retry.delay_for(attempt, retry_after);

                tracing::warn!(
                    "GET {} -> {} (attempt {}/{}), retrying in {:?}",
                    url,
                    status,
                    attempt,
                    self.retry.max_attempts,
                    pause
                );

                tokio::time::sleep(pause).await;
                attempt += 1;
                continue;
            }

            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                attempts: attempt,
            });
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        self.get_with_retry(url).await
    }
}

/// Maps a reqwest failure onto the crate's transport errors
fn classify_error(url: &str, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(600));
        assert_eq!(policy.backoff(2), Duration::from_millis(1200));
        assert_eq!(policy.backoff(3), Duration::from_millis(2400));
    }

    #[test]
    fn test_backoff_clamped() {
        let policy = RetryPolicy {
            backoff_max: Duration::from_secs(1),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(10), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_factor_never_sleeps() {
        let policy = RetryPolicy {
            backoff_factor: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(1), Duration::ZERO);
        assert_eq!(policy.backoff(5), Duration::ZERO);
    }

    #[test]
    fn test_should_retry_statuses() {
        let policy = RetryPolicy::default();
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.should_retry(status, 1), "status {}", status);
        }
        assert!(!policy.should_retry(404, 1));
        assert!(!policy.should_retry(501, 1));
    }

    #[test]
    fn test_should_retry_respects_attempt_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(503, 2));
        assert!(!policy.should_retry(503, 3));
        assert!(!RetryPolicy::no_retries().should_retry(503, 1));
    }

    #[test]
    fn test_retry_after_overrides_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(7))),
            Duration::from_secs(7)
        );
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(3600))),
            Duration::from_secs(120)
        );
        assert_eq!(policy.delay_for(2, None), Duration::from_millis(1200));
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let now = Utc::now();
        assert_eq!(parse_retry_after("5", now), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(" 0 ", now), Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:30 GMT", now),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:00:00 GMT", now),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_parse_retry_after_garbage() {
        assert_eq!(parse_retry_after("soon", Utc::now()), None);
    }

    #[test]
    fn test_transport_config_from_settings() {
        let config = TransportConfig::from_settings(&TransportSettings::default()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.headers.contains_key("user-agent"));
        assert_eq!(
            config.headers.get("accept-language").unwrap(),
            "en-US,en;q=0.8"
        );
    }

    #[test]
    fn test_build_http_client() {
        let config = TransportConfig::from_settings(&TransportSettings::default()).unwrap();
        assert!(HttpFetcher::new(&config).is_ok());
    }
}
