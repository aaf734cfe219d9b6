//! Cache Module
//!
//! Cache adapter contract, its in-memory and Redis backends, and the
//! read-through cache for list pages.

mod entry;
mod list;
mod memory;
#[cfg(feature = "redis")]
mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use entry::CacheEntry;
pub use list::ListCache;
pub use memory::InMemoryCache;
#[cfg(feature = "redis")]
pub use self::redis::RedisCache;

/// Failures raised by a cache backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Backend unreachable or command rejected
    #[error("cache backend error: {0}")]
    Backend(String),

    /// Call did not finish within the operation timeout
    #[error("cache operation timed out after {0}ms")]
    Timeout(u64),

    /// Cached bytes could not be encoded or decoded
    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Key/value store with per-entry expiry and explicit delete.
///
/// Used purely as an accelerator: a miss or an error must only make a
/// request slower, never wrong.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored bytes, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores bytes that expire after `ttl`, overwriting any previous value.
    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl: Duration)
        -> Result<(), CacheError>;

    /// Removes a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
