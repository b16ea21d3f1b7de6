//! Store Statistics Module
//!
//! Tracks store read metrics: hits, misses and lazily expired entries.

use serde::Serialize;

// == Store Stats ==
/// Snapshot of store metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Number of successful value retrievals
    pub hits: u64,
    /// Number of failed value retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expired: u64,
    /// Current number of values in the store
    pub total_entries: usize,
    /// Number of flushes since the store was created
    pub generation: u64,
}

impl StoreStats {
    // == Constructor ==
    /// Creates a new StoreStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the read hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds `count` entries to the expired tally.
    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }
}
