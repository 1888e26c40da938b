//! Expiry Cleanup Task
//!
//! Background task that periodically drops expired entries from every
//! registered cache, so entries nobody reads again still get freed.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::manager::CacheManager;

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs until aborted or until the manager is closed.
///
/// # Arguments
/// * `manager` - Registry whose caches are swept
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let manager = CacheManager::new();
/// let cleanup_handle = spawn_cleanup_task(manager.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(manager: CacheManager, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            match manager.purge_expired() {
                Ok(0) => debug!("Expiry cleanup: no expired entries found"),
                Ok(removed) => info!("Expiry cleanup: removed {} expired entries", removed),
                Err(e) => {
                    warn!("Expiry cleanup stopped: {}", e);
                    break;
                }
            }
        }
    })
}
