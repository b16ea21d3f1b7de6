//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds for cached URL content
    pub url_ttl: u64,
    /// Background purge task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `URL_CACHE_TTL` - URL cache TTL in seconds (default: 10)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            url_ttl: env::var("URL_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }

    /// URL cache TTL as a Duration.
    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl)
    }

    /// Purge interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_ttl: 10,
            cleanup_interval: 1,
        }
    }
}
