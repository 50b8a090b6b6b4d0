use crate::config::types::{
    Config, CrawlerConfig, SelectorConfig, SiteConfig, TransportSettings, MAX_DELAY_MS,
};
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_transport_settings(&config.transport)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates site identity configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    for (name, path) in [
        ("section-path", &config.section_path),
        ("article-prefix", &config.article_prefix),
    ] {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "{} must start with '/', got '{}'",
                name, path
            )));
        }
    }

    if config.brand.trim().is_empty() {
        return Err(ConfigError::Validation("brand cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates crawler pacing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // delay_ms is unsigned and 0 is a legitimate "no pause" value
    if config.delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "delay-ms must be <= {}, got {}",
            MAX_DELAY_MS, config.delay_ms
        )));
    }
    Ok(())
}

/// Validates transport and retry settings
fn validate_transport_settings(config: &TransportSettings) -> Result<(), ConfigError> {
    if !(config.timeout_secs.is_finite() && config.timeout_secs > 0.0) {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be > 0, got {}",
            config.timeout_secs
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !(config.backoff_factor.is_finite() && config.backoff_factor >= 0.0) {
        return Err(ConfigError::Validation(format!(
            "backoff-factor must be >= 0, got {}",
            config.backoff_factor
        )));
    }

    if !(config.backoff_max_secs.is_finite() && config.backoff_max_secs >= 0.0) {
        return Err(ConfigError::Validation(format!(
            "backoff-max-secs must be >= 0, got {}",
            config.backoff_max_secs
        )));
    }

    if let Some(status) = config
        .retry_statuses
        .iter()
        .find(|s| !(100..=599).contains(*s))
    {
        return Err(ConfigError::Validation(format!(
            "retry-statuses contains invalid HTTP status {}",
            status
        )));
    }

    for (name, value) in &config.headers {
        if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(ConfigError::Validation(format!(
                "invalid header name '{}'",
                name
            )));
        }
        if reqwest::header::HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "invalid value for header '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Validates that every selector compiles and every pattern is a valid regex
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, list) in [("title", &config.title), ("body", &config.body)] {
        if list.is_empty() {
            return Err(ConfigError::Validation(format!(
                "selectors.{} must list at least one selector",
                name
            )));
        }
        for selector in list {
            compile_selector(selector)?;
        }
    }

    for selector in [
        &config.list_anchor,
        &config.next_page,
        &config.visible_date,
        &config.image,
        &config.caption,
    ] {
        compile_selector(selector)?;
    }

    for (attr, value) in config.published_meta.iter().chain(&config.title_meta) {
        compile_selector(&meta_selector(attr, value))?;
    }

    for pattern in [&config.text_date_pattern, &config.byline_pattern] {
        let regex =
            Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(ConfigError::InvalidPattern(format!(
                "pattern '{}' needs a capture group",
                pattern
            )));
        }
    }

    Ok(())
}

/// Compiles a CSS selector, mapping failures to a config error
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Builds the CSS selector for a `<meta attr="value">` tag
pub fn meta_selector(attr: &str, value: &str) -> String {
    format!("meta[{}=\"{}\"]", attr, value.replace('"', "\\\""))
}
