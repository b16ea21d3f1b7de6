//! Traced Cache - An in-process key-value cache
//!
//! Provides a typed value store with TTL expiration, call counting and
//! replayable call history for traced operations, and a URL content cache
//! with per-URL access counting.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod recorder;
pub mod tasks;
pub mod web;

pub use cache::{StoredValue, ValueStore};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use recorder::{CallRecorder, Replay, ReplayEngine};
pub use tasks::spawn_cleanup_task;
pub use web::{cache_and_count_access, Fetcher, UrlCache};
