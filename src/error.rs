//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key, URL or traced method not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A converter could not interpret the stored value
    #[error("Conversion failure: {0}")]
    ConversionFailure(String),

    /// The injected fetch function failed; never cached
    #[error("Upstream fetch failed for {url}: {source}")]
    UpstreamFetchFailure {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
