//! List Cache Module
//!
//! Read-through cache for paginated list results. Every key written is
//! tracked until its TTL passes so that writes to the store can invalidate
//! exactly the pages that may now be stale.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{CacheBackend, CacheError};
use crate::models::PagedResult;

// == Tracked Keys ==
/// Keys written to the backend and the instant each one expires there.
///
/// The TTL is fixed, so `order` is sorted by expiry and pruning only looks at
/// its front. A key re-written before it expires has a stale entry in `order`
/// that is skipped when its instant no longer matches `expires`.
#[derive(Default)]
struct TrackedKeys {
    expires: HashMap<String, Instant>,
    order: VecDeque<(Instant, String)>,
}

impl TrackedKeys {
    fn insert(&mut self, key: String, expires_at: Instant) {
        self.expires.insert(key.clone(), expires_at);
        self.order.push_back((expires_at, key));
    }

    /// Forgets every key whose backend entry has already expired.
    fn prune(&mut self, now: Instant) {
        while self.order.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((at, key)) = self.order.pop_front() {
                if self.expires.get(&key) == Some(&at) {
                    self.expires.remove(&key);
                }
            }
        }
    }

    fn drain(&mut self) -> Vec<String> {
        self.order.clear();
        self.expires.drain().map(|(key, _)| key).collect()
    }

    fn len(&self) -> usize {
        self.expires.len()
    }
}

// == List Cache ==
pub struct ListCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    op_timeout: Duration,
    tracked: Mutex<TrackedKeys>,
}

impl ListCache {
    // == Constructor ==
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            backend,
            ttl,
            op_timeout,
            tracked: Mutex::new(TrackedKeys::default()),
        }
    }

    // == Get ==
    /// Returns the cached page for `key`.
    ///
    /// Backend failures and undecodable entries are logged and read as a miss.
    pub async fn get(&self, key: &str) -> Option<PagedResult> {
        let bytes = match self.guard(self.backend.get(key)).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("List cache miss: {}", key);
                return None;
            }
            Err(e) => {
                warn!("List cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(page) => {
                debug!("List cache hit: {}", key);
                Some(page)
            }
            Err(e) => {
                warn!("Discarding undecodable list cache entry {}: {}", key, e);
                None
            }
        }
    }

    // == Put ==
    /// Stores a page under `key` and tracks the key for invalidation.
    ///
    /// The key is tracked once the write has finished, so an invalidation that
    /// ran while the write was in flight still leaves the key for the next one.
    /// A write that timed out may still land, so it is tracked as well.
    pub async fn put(&self, key: &str, page: &PagedResult) {
        let bytes = match serde_json::to_vec(page) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{}", CacheError::Serialization(e.to_string()));
                return;
            }
        };

        match self
            .guard(self.backend.set_with_expiry(key, bytes, self.ttl))
            .await
        {
            Ok(()) => {}
            Err(e @ CacheError::Timeout(_)) => {
                warn!("List cache write for {} did not confirm: {}", key, e);
            }
            Err(e) => {
                warn!("List cache write failed for {}: {}", key, e);
                return;
            }
        }

        let now = Instant::now();
        let mut tracked = self.tracked.lock().await;
        tracked.prune(now);
        tracked.insert(key.to_string(), now + self.ttl);
    }

    // == Invalidate All ==
    /// Deletes every tracked list page. Returns the number of keys deleted.
    pub async fn invalidate_all(&self) -> usize {
        let keys = self.tracked.lock().await.drain();

        let mut deleted = 0;
        for key in &keys {
            match self.guard(self.backend.delete(key)).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!("List cache invalidation failed for {}: {}", key, e),
            }
        }

        if !keys.is_empty() {
            debug!("List cache invalidated {} of {} keys", deleted, keys.len());
        }
        deleted
    }

    // == Tracked Keys ==
    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.tracked.lock().await.len()
    }

    async fn guard<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.op_timeout.as_millis() as u64)),
        }
    }
}
