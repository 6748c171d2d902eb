//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from in-process
//! stores. Expired entries are already invisible to reads; this only frees
//! their memory.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A store that can drop its expired entries in bulk.
#[async_trait]
pub trait PurgeExpired: Send + Sync {
    /// Removes expired entries and returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs.
///
/// # Arguments
/// * `target` - The store to sweep
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which the caller aborts on shutdown.
///
/// # Example
/// ```ignore
/// let backend = Arc::new(MemoryBackend::new(1000));
/// let cleanup_handle = spawn_cleanup_task(backend.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<S>(target: Arc<S>, cleanup_interval_secs: u64) -> JoinHandle<()>
where
    S: PurgeExpired + ?Sized + 'static,
{
    // A zero interval would spin
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = target.purge_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
