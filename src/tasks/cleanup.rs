//! TTL Cleanup Task
//!
//! Background task that periodically removes expired in-memory cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::InMemoryCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Expired list pages are already invisible to readers; the sweep only
/// reclaims memory for keys nobody asks for again.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(cache: Arc<InMemoryCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheBackend;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Arc::new(InMemoryCache::new());
        cache
            .set_with_expiry("expire_soon", b"page".to_vec(), Duration::from_millis(200))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Wait for entry to expire and cleanup to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.is_empty().await, "Expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = Arc::new(InMemoryCache::new());
        cache
            .set_with_expiry("long_lived", b"page".to_vec(), Duration::from_secs(3600))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len().await, 1, "Valid entry should not be removed");
        assert!(cache.get("long_lived").await.unwrap().is_some());
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(InMemoryCache::new());

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
