//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which record store persists books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackendKind {
    /// Process memory, lost on restart
    Memory,
    /// PostgreSQL at `STORE_URL` (requires the `postgres` feature)
    Postgres,
}

impl FromStr for StoreBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Which cache adapter backs the list cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// In-process TTL map swept by the cleanup task
    Memory,
    /// External Redis server (requires the `redis` feature)
    Redis,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Record store used for books
    pub store_backend: StoreBackendKind,
    /// Store connection string, used when `store_backend` is `Postgres`
    pub store_url: String,
    /// Connection pool size for the Postgres store
    pub store_max_connections: u32,
    /// Cache adapter used for list results
    pub cache_backend: CacheBackendKind,
    /// Redis host, used when `cache_backend` is `Redis`
    pub redis_host: String,
    /// Redis port, used when `cache_backend` is `Redis`
    pub redis_port: u16,
    /// TTL in seconds for cached list pages
    pub cache_ttl: u64,
    /// In-memory cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// Upper bound in milliseconds for any single store, cache or broadcast call
    pub operation_timeout_ms: u64,
    /// Number of events buffered per live listener
    pub broadcast_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 4000)
    /// - `STORE_BACKEND` - `memory` or `postgres` (default: memory)
    /// - `STORE_URL` - Store connection string (default: postgres://localhost:5432/bookshelf)
    /// - `STORE_MAX_CONNECTIONS` - Postgres pool size (default: 5)
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `REDIS_HOST` - Redis host (default: localhost)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `CACHE_TTL` - List cache TTL in seconds (default: 30)
    /// - `CLEANUP_INTERVAL` - In-memory sweep frequency in seconds (default: 5)
    /// - `OPERATION_TIMEOUT_MS` - Per-call timeout in milliseconds (default: 5000)
    /// - `BROADCAST_CAPACITY` - Per-listener event buffer (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("PORT").unwrap_or(defaults.server_port),
            store_backend: parse_var("STORE_BACKEND").unwrap_or(defaults.store_backend),
            store_url: env::var("STORE_URL").unwrap_or(defaults.store_url),
            store_max_connections: parse_var("STORE_MAX_CONNECTIONS")
                .unwrap_or(defaults.store_max_connections),
            cache_backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.cache_backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            operation_timeout_ms: parse_var("OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            broadcast_capacity: parse_var("BROADCAST_CAPACITY")
                .unwrap_or(defaults.broadcast_capacity),
        }
    }

    /// Connection URL for the Redis cache backend.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 4000,
            store_backend: StoreBackendKind::Memory,
            store_url: "postgres://localhost:5432/bookshelf".to_string(),
            store_max_connections: 5,
            cache_backend: CacheBackendKind::Memory,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            cache_ttl: 30,
            cleanup_interval: 5,
            operation_timeout_ms: 5000,
            broadcast_capacity: 256,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
