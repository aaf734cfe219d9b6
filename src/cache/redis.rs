//! Redis cache backend.

use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{CacheBackend, CacheError};

/// Cache backend talking to an external Redis server.
///
/// `ConnectionManager` reconnects on its own and is cheap to clone, so each
/// call works on a clone instead of holding a lock.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to the server at `url` (e.g. `redis://localhost:6379/`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Backend(format!("invalid Redis URL {}: {}", url, e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(format!("failed to connect to Redis: {}", e)))?;

        info!("Redis cache backend connected: {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Backend(format!("GET {} failed: {}", key, e)))?;

        debug!("Redis GET {} -> {}", key, if value.is_some() { "HIT" } else { "MISS" });
        Ok(value)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CacheError::Backend(format!("SETEX {} failed: {}", key, e)))?;

        debug!("Redis SETEX {} ({}s)", key, seconds);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Backend(format!("DEL {} failed: {}", key, e)))?;
        Ok(())
    }
}
