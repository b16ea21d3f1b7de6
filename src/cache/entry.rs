//! Cache Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

use std::time::Duration;

// == Cache Entry ==
/// Represents a single store entry with value and metadata.
///
/// Timestamps are milliseconds on the store's `Clock`.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp
    pub created_at: u64,
    /// Expiration timestamp, None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry created at `now` with optional TTL.
    pub fn new(value: V, now: u64, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|ttl| now.saturating_add(ttl.as_millis() as u64));

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches the expiration time, so an entry
    /// with a TTL of 10s is gone exactly 10s after creation.
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self, now: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now))
    }
}
