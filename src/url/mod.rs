//! URL handling module for News-Harvest
//!
//! Resolves possibly-relative links found in markup and turns them into
//! canonical, percent-encoded absolute URLs. A link that cannot be resolved
//! is simply absent; normalization never fails a crawl.

mod normalize;

pub use normalize::{abs_and_encode, encode_url};
