//! URL Cache
//!
//! Caches fetched page content by URL with a fixed TTL and counts every
//! access to each URL.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::{StoredValue, ValueStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::web::Fetcher;

/// TTL applied to cached page content.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(10);

/// Store counter key holding the access count of `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

// == Url Cache ==
/// Fetch-on-miss cache keyed by URL.
///
/// The access counter for a URL is bumped before the freshness check, so hits,
/// misses and failed fetches all count. Counters outlive the cached content.
pub struct UrlCache<F> {
    store: Arc<ValueStore>,
    fetcher: F,
    ttl: Duration,
}

impl<F: Fetcher> UrlCache<F> {
    // == Constructor ==
    pub fn new(store: Arc<ValueStore>, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            ttl: DEFAULT_URL_TTL,
        }
    }

    /// Creates a cache using the TTL from configuration.
    pub fn from_config(store: Arc<ValueStore>, fetcher: F, config: &Config) -> Self {
        Self::new(store, fetcher).with_ttl(config.url_ttl())
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get Page ==
    /// Returns the content of `url`, fetching it only when no live copy is
    /// cached. Fetch failures are returned to the caller and never cached.
    pub fn get_page(&self, url: &str) -> Result<String> {
        let access_count = self.store.incr(&count_key(url));

        match self.store.get_str(url) {
            Ok(content) => {
                info!(url, access_count, "Returning cached content");
                return Ok(content);
            }
            Err(CacheError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let content =
            self.fetcher
                .fetch(url)
                .map_err(|source| CacheError::UpstreamFetchFailure {
                    url: url.to_string(),
                    source,
                })?;

        self.store
            .put(url, StoredValue::Text(content.clone()), Some(self.ttl));
        info!(url, access_count, "Caching content");
        Ok(content)
    }

    /// Number of `get_page` calls made for `url` since the last flush.
    pub fn access_count(&self, url: &str) -> u64 {
        self.store.counter(&count_key(url)).unwrap_or(0)
    }

    /// Turns the cache into a plain function with the same semantics.
    pub fn into_fn(self) -> impl Fn(&str) -> Result<String> + Send + Sync {
        move |url: &str| self.get_page(url)
    }
}

// == Decorator Form ==
/// Wraps `fetcher` so each call counts the access and serves cached content
/// while it is fresh. Behaves exactly like `UrlCache::get_page`.
pub fn cache_and_count_access<F: Fetcher>(
    store: Arc<ValueStore>,
    fetcher: F,
) -> impl Fn(&str) -> Result<String> + Send + Sync {
    UrlCache::new(store, fetcher).into_fn()
}
