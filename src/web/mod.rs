//! Web Module
//!
//! URL content caching over an injected fetch function.

mod fetcher;
mod url_cache;

pub use fetcher::Fetcher;
pub use url_cache::{cache_and_count_access, count_key, UrlCache, DEFAULT_URL_TTL};
