//! In-Memory Cache Module
//!
//! HashMap storage with TTL expiration. Expired entries are dropped lazily on
//! read and in bulk by the cleanup task.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheBackend, CacheEntry, CacheError};

// == In-Memory Cache ==
/// Process-local cache backend.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it unless a writer refreshed it meanwhile
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache.set_with_expiry("key1", b"value1".to_vec(), TTL).await.unwrap();
        let value = cache.get("key1").await.unwrap();

        assert_eq!(value.as_deref(), Some(&b"value1"[..]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = InMemoryCache::new();
        assert!(cache.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();

        cache.set_with_expiry("key1", b"value1".to_vec(), TTL).await.unwrap();
        cache.delete("key1").await.unwrap();
        cache.delete("never-set").await.unwrap();

        assert!(cache.is_empty().await);
        assert!(cache.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let cache = InMemoryCache::new();

        cache.set_with_expiry("key1", b"value1".to_vec(), TTL).await.unwrap();
        cache.set_with_expiry("key1", b"value2".to_vec(), TTL).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some(&b"value2"[..]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = InMemoryCache::new();

        cache
            .set_with_expiry("key1", b"value1".to_vec(), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get("key1").await.unwrap().is_none());
        assert!(cache.is_empty().await, "expired entry is dropped on read");
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let cache = InMemoryCache::new();

        cache
            .set_with_expiry("key1", b"value1".to_vec(), Duration::from_millis(50))
            .await
            .unwrap();
        cache.set_with_expiry("key2", b"value2".to_vec(), TTL).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.cleanup_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("key2").await.unwrap().is_some());
    }
}
