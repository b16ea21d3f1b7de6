//! Cache Module
//!
//! Provides the in-process value store with TTL expiration, counters and
//! call history logs.

mod entry;
mod history;
mod keygen;
mod stats;
mod store;
mod value;


// Re-export public types
pub use entry::CacheEntry;
pub use history::{CallRecord, CallSlot};
pub use keygen::{KeyGenerator, UuidKeyGenerator};
pub use stats::StoreStats;
pub use store::ValueStore;
pub use value::{to_bytes, to_float, to_int, to_text, StoredValue};
