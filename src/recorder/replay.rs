//! Replay Engine
//!
//! Rebuilds the call timeline of a traced operation from the store.

use std::fmt;
use std::io;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::ValueStore;
use crate::error::{CacheError, Result};

// == Replay ==
/// Call count and paired input/output history of one traced operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    pub method: String,
    pub calls: u64,
    pub entries: Vec<ReplayEntry>,
}

/// One finished call: serialized arguments and result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayEntry {
    pub input: String,
    pub output: String,
}

impl Replay {
    /// Writes the human-readable trace to `out`.
    pub fn write_to<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} was called {} times:", self.method, self.calls)?;
        for entry in &self.entries {
            writeln!(f, "{}(*{}) -> {}", self.method, entry.input, entry.output)?;
        }
        Ok(())
    }
}

// == Replay Engine ==
/// Read-only projection of recorded call state.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    store: Arc<ValueStore>,
}

impl ReplayEngine {
    pub fn new(store: Arc<ValueStore>) -> Self {
        Self { store }
    }

    /// Builds the replay of `method`.
    ///
    /// A method with neither a counter nor any logged call was never observed
    /// and yields NotFound. A method with logged calls but no counter (history
    /// without counting) reports zero calls. Calls still in flight are left
    /// out, since their output position is not filled yet.
    pub fn replay(&self, method: &str) -> Result<Replay> {
        let (counter, records) = self.store.call_summary(method);

        if counter.is_none() && records.is_empty() {
            return Err(CacheError::NotFound(format!("no calls recorded for {}", method)));
        }

        let entries = records
            .into_iter()
            .filter_map(|record| {
                record.output.map(|output| ReplayEntry {
                    input: record.input,
                    output,
                })
            })
            .collect();

        Ok(Replay {
            method: method.to_string(),
            calls: counter.unwrap_or(0),
            entries,
        })
    }

    /// Builds the replay of `method` and writes it to `out`.
    pub fn replay_to<W: io::Write>(&self, method: &str, out: W) -> anyhow::Result<()> {
        let replay = self.replay(method)?;
        replay.write_to(out)?;
        Ok(())
    }
}
