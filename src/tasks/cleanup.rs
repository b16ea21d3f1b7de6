//! TTL Cleanup Task
//!
//! Background task that periodically purges expired store entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ValueStore;

/// Spawns a background task that periodically purges expired store entries.
///
/// Expired entries are already invisible to readers; the task only reclaims
/// their memory. It runs until the returned handle is aborted.
///
/// # Example
/// ```ignore
/// let store = Arc::new(ValueStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval());
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<ValueStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
