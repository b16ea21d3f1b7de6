//! Value Store Module
//!
//! Main store engine: typed values under random keys, named counters and
//! per-method call logs, all behind one lock so a flush clears them together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::history::{CallLog, CallRecord, CallSlot};
use crate::cache::value::{to_int, to_text};
use crate::cache::{CacheEntry, KeyGenerator, StoreStats, StoredValue, UuidKeyGenerator};
use crate::clock::{Clock, MonotonicClock};
use crate::error::{CacheError, Result};

// == Store State ==
#[derive(Debug, Default)]
struct StoreState {
    values: HashMap<String, CacheEntry<StoredValue>>,
    counters: HashMap<String, u64>,
    histories: HashMap<String, CallLog>,
    stats: StoreStats,
    /// Bumped by every flush; call slots from older generations are dropped
    generation: u64,
}

// == Value Store ==
/// Thread-safe in-process store.
///
/// Values are immutable once stored. Counters only grow. Call logs are
/// append-only. The only way to remove anything is TTL expiry or `flush`.
#[derive(Debug)]
pub struct ValueStore {
    state: Mutex<StoreState>,
    keys: Box<dyn KeyGenerator>,
    clock: Arc<dyn Clock>,
}

impl ValueStore {
    // == Constructor ==
    /// Creates an empty store with UUID keys and a monotonic clock.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            keys: Box::new(UuidKeyGenerator),
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    /// Replaces the time source used for TTL checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the key source used by `store`.
    pub fn with_key_generator(mut self, keys: impl KeyGenerator + 'static) -> Self {
        self.keys = Box::new(keys);
        self
    }

    // == Store ==
    /// Stores a value under a freshly generated key and returns the key.
    pub fn store(&self, value: impl Into<StoredValue>) -> String {
        self.store_entry(value.into(), None)
    }

    /// Stores a value that expires after `ttl`.
    pub fn store_with_ttl(&self, value: impl Into<StoredValue>, ttl: Duration) -> String {
        self.store_entry(value.into(), Some(ttl))
    }

    fn store_entry(&self, value: StoredValue, ttl: Option<Duration>) -> String {
        let key = self.keys.generate();
        self.put(&key, value, ttl);
        debug!(key = %key, "Stored value");
        key
    }

    /// Installs a whole entry under a caller-chosen key, replacing any previous
    /// entry. Used by the URL cache, which keys content by URL.
    pub(crate) fn put(&self, key: &str, value: StoredValue, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.state.lock().values.insert(key.to_string(), entry);
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Expired entries are removed and reported as NotFound.
    pub fn get(&self, key: &str) -> Result<StoredValue> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let fresh = state.values.get(key).map(|entry| !entry.is_expired(now));
        match fresh {
            Some(true) => {
                state.stats.record_hit();
                state
                    .values
                    .get(key)
                    .map(|entry| entry.value.clone())
                    .ok_or_else(|| CacheError::NotFound(key.to_string()))
            }
            Some(false) => {
                state.values.remove(key);
                state.stats.record_expired(1);
                state.stats.record_miss();
                debug!(key = %key, "Dropped expired value on read");
                Err(CacheError::NotFound(key.to_string()))
            }
            None => {
                state.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    /// Retrieves the value under `key` and passes it through `convert`.
    ///
    /// `convert` is only applied when the key exists; its errors are returned
    /// unchanged.
    pub fn get_with<T, F>(&self, key: &str, convert: F) -> Result<T>
    where
        F: FnOnce(&StoredValue) -> Result<T>,
    {
        let value = self.get(key)?;
        convert(&value)
    }

    /// Retrieves the value under `key` as UTF-8 text.
    pub fn get_str(&self, key: &str) -> Result<String> {
        self.get_with(key, to_text)
    }

    /// Retrieves the value under `key` as an integer.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_with(key, to_int)
    }

    // == Counters ==
    /// Atomically increments the counter `name` and returns the new count.
    pub fn incr(&self, name: &str) -> u64 {
        let mut state = self.state.lock();
        let count = state.counters.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current value of counter `name`, or None if it was never incremented.
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.state.lock().counters.get(name).copied()
    }

    // == Call History ==
    /// Appends `input` to the input log of `method` and reserves the output
    /// position paired with it.
    pub fn begin_call(&self, method: &str, input: String) -> CallSlot {
        let mut state = self.state.lock();
        let generation = state.generation;
        let index = state
            .histories
            .entry(method.to_string())
            .or_default()
            .open(input);

        CallSlot {
            method: method.to_string(),
            index,
            generation,
        }
    }

    /// Records `output` in the position reserved by `slot`.
    ///
    /// Returns false when the store was flushed since the slot was opened; the
    /// output is then discarded.
    pub fn finish_call(&self, slot: CallSlot, output: String) -> bool {
        let mut state = self.state.lock();
        if slot.generation != state.generation {
            debug!(method = %slot.method, "Discarding output of call opened before flush");
            return false;
        }

        state
            .histories
            .get_mut(&slot.method)
            .map(|log| log.complete(slot.index, output))
            .unwrap_or(false)
    }

    /// Counter and call records of `method`, read in one critical section.
    pub fn call_summary(&self, method: &str) -> (Option<u64>, Vec<CallRecord>) {
        let state = self.state.lock();
        let counter = state.counters.get(method).copied();
        let records = state
            .histories
            .get(method)
            .map(|log| log.records(method))
            .unwrap_or_default();
        (counter, records)
    }

    /// Paired call records of `method`, in log order.
    pub fn records(&self, method: &str) -> Vec<CallRecord> {
        self.state
            .lock()
            .histories
            .get(method)
            .map(|log| log.records(method))
            .unwrap_or_default()
    }

    /// The input log of `method`.
    pub fn inputs(&self, method: &str) -> Vec<String> {
        self.state
            .lock()
            .histories
            .get(method)
            .map(|log| log.inputs().to_vec())
            .unwrap_or_default()
    }

    /// The output log of `method`; positions of unfinished calls are None.
    pub fn outputs(&self, method: &str) -> Vec<Option<String>> {
        self.state
            .lock()
            .histories
            .get(method)
            .map(|log| log.outputs().to_vec())
            .unwrap_or_default()
    }

    // == Flush ==
    /// Clears values, counters and call logs in one step.
    pub fn flush(&self) {
        let mut state = self.state.lock();
        let generation = state.generation + 1;
        *state = StoreState {
            generation,
            ..StoreState::default()
        };
        info!(generation, "Store flushed");
    }

    // == Purge Expired ==
    /// Removes all expired values from the store.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let before = state.values.len();
        state.values.retain(|_, entry| !entry.is_expired(now));
        let removed = before - state.values.len();

        state.stats.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> StoreStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.values.len();
        stats.generation = state.generation;
        stats
    }

    /// Number of values currently held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.state.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().values.is_empty()
    }
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::to_float;
    use crate::clock::ManualClock;

    fn store_with_manual_clock() -> (ValueStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = ValueStore::new().with_clock(clock.clone());
        (store, clock)
    }

    #[derive(Debug)]
    struct FixedKeys(&'static str);

    impl KeyGenerator for FixedKeys {
        fn generate(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_store_new() {
        let store = ValueStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_and_get() {
        let store = ValueStore::new();

        let key = store.store("hello");
        assert_eq!(store.get(&key).unwrap(), StoredValue::Text("hello".to_string()));
        assert_eq!(store.get_str(&key).unwrap(), "hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_returns_distinct_keys() {
        let store = ValueStore::new();

        let a = store.store(1);
        let b = store.store(1);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_uses_key_generator() {
        let store = ValueStore::new().with_key_generator(FixedKeys("fixed"));
        assert_eq!(store.store("x"), "fixed");
        assert!(store.get("fixed").is_ok());
    }

    #[test]
    fn test_get_nonexistent() {
        let store = ValueStore::new();

        let result = store.get("nonexistent");
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_get_with_conversion_failure() {
        let store = ValueStore::new();

        let key = store.store("hello");
        let result = store.get_int(&key);
        assert!(matches!(result, Err(CacheError::ConversionFailure(_))));
    }

    #[test]
    fn test_get_with_absent_key_skips_convert() {
        let store = ValueStore::new();
        let mut called = false;

        let result = store.get_with("missing", |_| {
            called = true;
            Ok(())
        });

        assert!(matches!(result, Err(CacheError::NotFound(_))));
        assert!(!called);
    }

    #[test]
    fn test_typed_round_trips() {
        let store = ValueStore::new();

        let bytes = store.store(b"\x00\x01".as_slice());
        let int = store.store(42);
        let float = store.store(0.25);

        assert_eq!(store.get(&bytes).unwrap(), StoredValue::Bytes(vec![0, 1]));
        assert_eq!(store.get_int(&int).unwrap(), 42);
        assert_eq!(store.get_str(&int).unwrap(), "42");
        assert_eq!(store.get_with(&float, to_float).unwrap(), 0.25);
    }

    #[test]
    fn test_integral_float_is_not_an_integer() {
        let store = ValueStore::new();

        let key = store.store(2.0f64);
        assert!(matches!(store.get_int(&key), Err(CacheError::ConversionFailure(_))));
        assert_eq!(store.get_str(&key).unwrap(), "2.0");
        assert_eq!(store.get_with(&key, to_float).unwrap(), 2.0);
    }

    #[test]
    fn test_ttl_expiration() {
        let (store, clock) = store_with_manual_clock();

        let key = store.store_with_ttl("value", Duration::from_secs(1));
        assert!(store.get(&key).is_ok());

        clock.advance(Duration::from_millis(1000));

        assert!(matches!(store.get(&key), Err(CacheError::NotFound(_))));
        assert!(store.is_empty());
        assert_eq!(store.stats().expired, 1);
    }

    #[test]
    fn test_purge_expired() {
        let (store, clock) = store_with_manual_clock();

        store.store_with_ttl("short", Duration::from_secs(1));
        let long = store.store_with_ttl("long", Duration::from_secs(10));
        let forever = store.store("forever");

        clock.advance(Duration::from_secs(2));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.get(&long).is_ok());
        assert!(store.get(&forever).is_ok());
    }

    #[test]
    fn test_incr_and_counter() {
        let store = ValueStore::new();

        assert_eq!(store.counter("op"), None);
        assert_eq!(store.incr("op"), 1);
        assert_eq!(store.incr("op"), 2);
        assert_eq!(store.counter("op"), Some(2));
    }

    #[test]
    fn test_call_history_pairs() {
        let store = ValueStore::new();

        let slot = store.begin_call("op", "[1]".to_string());
        assert_eq!(slot.index(), 0);
        assert!(store.finish_call(slot, "2".to_string()));

        assert_eq!(store.inputs("op"), vec!["[1]".to_string()]);
        assert_eq!(store.outputs("op"), vec![Some("2".to_string())]);
        assert!(store.records("op")[0].is_complete());
    }

    #[test]
    fn test_call_summary() {
        let store = ValueStore::new();
        assert_eq!(store.call_summary("op"), (None, Vec::new()));

        store.incr("op");
        let slot = store.begin_call("op", "[]".to_string());
        let (counter, records) = store.call_summary("op");
        assert_eq!(counter, Some(1));
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_complete());
        assert!(store.finish_call(slot, "null".to_string()));
    }

    #[test]
    fn test_flush_clears_everything() {
        let store = ValueStore::new();

        let key = store.store("value");
        store.incr("op");
        let slot = store.begin_call("op", "[]".to_string());
        assert!(store.finish_call(slot, "null".to_string()));

        store.flush();

        assert!(store.get(&key).is_err());
        assert_eq!(store.counter("op"), None);
        assert!(store.records("op").is_empty());
        assert_eq!(store.stats().generation, 1);
    }

    #[test]
    fn test_flush_discards_in_flight_call() {
        let store = ValueStore::new();

        let slot = store.begin_call("op", "[\"stale\"]".to_string());
        store.flush();

        let fresh = store.begin_call("op", "[\"fresh\"]".to_string());
        assert!(!store.finish_call(slot, "\"stale\"".to_string()));
        assert!(store.finish_call(fresh, "\"fresh\"".to_string()));

        let records = store.records("op");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].output.as_deref(), Some("\"fresh\""));
    }

    #[test]
    fn test_stats() {
        let store = ValueStore::new();

        let key = store.store("value");
        store.get(&key).unwrap(); // hit
        let _ = store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
