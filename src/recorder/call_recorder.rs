//! Call Recorder
//!
//! Higher-order wrappers that count invocations of an operation and log its
//! serialized arguments and results in the store.

use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::cache::ValueStore;

// == Call Recorder ==
/// Instruments operations registered under a stable name.
///
/// Operations take a single argument; use a tuple for several. The counting
/// and history layers each own one concern, so they compose without counting
/// a call twice:
///
/// ```ignore
/// let recorder = CallRecorder::new(store.clone(), "Cache.store");
/// let traced = recorder.trace(move |value: String| store.store(value));
/// let key = traced("hello".to_string());
/// ```
#[derive(Debug, Clone)]
pub struct CallRecorder {
    store: Arc<ValueStore>,
    name: Arc<str>,
}

impl CallRecorder {
    pub fn new(store: Arc<ValueStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: Arc::from(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &Arc<ValueStore> {
        &self.store
    }

    /// Number of counted invocations since the last flush.
    pub fn calls(&self) -> u64 {
        self.store.counter(&self.name).unwrap_or(0)
    }

    // == Counting ==
    /// Wraps `op` so every invocation increments the counter for this name.
    pub fn count<A, R, F>(&self, op: F) -> impl Fn(A) -> R + Send + Sync
    where
        F: Fn(A) -> R + Send + Sync,
    {
        let recorder = self.clone();
        move |args: A| {
            recorder.store.incr(&recorder.name);
            op(args)
        }
    }

    // == History ==
    /// Wraps `op` so every invocation appends its arguments to the input log
    /// and its result to the paired position of the output log.
    pub fn history<A, R, F>(&self, op: F) -> impl Fn(A) -> R + Send + Sync
    where
        A: Serialize,
        R: Serialize,
        F: Fn(A) -> R + Send + Sync,
    {
        let recorder = self.clone();
        move |args: A| {
            let slot = recorder.store.begin_call(&recorder.name, encode(&args));
            let result = op(args);
            recorder.store.finish_call(slot, encode(&result));
            result
        }
    }

    /// Like `history` for fallible operations. Errors are logged as
    /// `"error: <message>"` and returned untouched.
    pub fn try_history<A, T, E, F>(&self, op: F) -> impl Fn(A) -> Result<T, E> + Send + Sync
    where
        A: Serialize,
        T: Serialize,
        E: Display,
        F: Fn(A) -> Result<T, E> + Send + Sync,
    {
        let recorder = self.clone();
        move |args: A| {
            let slot = recorder.store.begin_call(&recorder.name, encode(&args));
            let result = op(args);
            let output = match &result {
                Ok(value) => encode(value),
                Err(e) => encode(&format!("error: {}", e)),
            };
            recorder.store.finish_call(slot, output);
            result
        }
    }

    // == Tracing ==
    /// Counting plus history: increments first, then logs the call.
    pub fn trace<A, R, F>(&self, op: F) -> impl Fn(A) -> R + Send + Sync
    where
        A: Serialize,
        R: Serialize,
        F: Fn(A) -> R + Send + Sync,
    {
        self.count(self.history(op))
    }

    /// Counting plus history for fallible operations.
    pub fn try_trace<A, T, E, F>(&self, op: F) -> impl Fn(A) -> Result<T, E> + Send + Sync
    where
        A: Serialize,
        T: Serialize,
        E: Display,
        F: Fn(A) -> Result<T, E> + Send + Sync,
    {
        self.count(self.try_history(op))
    }
}

/// JSON form of a call argument or result.
///
/// A value serde cannot encode still occupies its log position so the input
/// and output logs stay paired.
fn encode<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize traced value");
        serde_json::Value::String(format!("<unserializable: {}>", e)).to_string()
    })
}
