//! Configuration module for News-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All sections are optional; the built-in defaults describe the Econostream
//! news index.
//!
//! # Example
//!
//! ```no_run
//! use news_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawl starts at: {}", config.site.start_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_headers, Config, CrawlerConfig, SelectorConfig, SiteConfig, TransportSettings,
    DEFAULT_BASE_URL, MAX_DELAY_MS,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_or_default, parse_config,
};
pub use validation::{compile_selector, meta_selector, validate};
