//! Bookshelf - A book catalogue REST API
//!
//! CRUD over book records with a short-lived cache for list pages and live
//! `newBook` notifications over WebSocket.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf::api::{create_router, AppState};
use bookshelf::cache::{CacheBackend, InMemoryCache};
use bookshelf::config::{CacheBackendKind, Config, StoreBackendKind};
use bookshelf::spawn_cleanup_task;
use bookshelf::store::{BookRepository, InMemoryBookStore};

/// Main entry point for the Bookshelf server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the record store and the configured cache backend
/// 4. Start the cache sweep task (in-memory backend only)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bookshelf server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, store_backend={:?}, cache_backend={:?}, cache_ttl={}s, operation_timeout={}ms",
        config.server_port,
        config.store_backend,
        config.cache_backend,
        config.cache_ttl,
        config.operation_timeout_ms
    );

    let store = build_store(&config).await?;
    let (cache, cleanup_handle) = build_cache(&config).await?;
    info!("Record store and cache initialized");

    let state = AppState::new(&config, store, cache);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Creates the configured record store.
async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn BookRepository>> {
    match config.store_backend {
        StoreBackendKind::Memory => Ok(Arc::new(InMemoryBookStore::new())),
        StoreBackendKind::Postgres => postgres_store(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn postgres_store(config: &Config) -> anyhow::Result<Arc<dyn BookRepository>> {
    let store =
        bookshelf::store::PostgresBookStore::connect(&config.store_url, config.store_max_connections)
            .await
            .context("failed to open the Postgres book store")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_store(_config: &Config) -> anyhow::Result<Arc<dyn BookRepository>> {
    anyhow::bail!("STORE_BACKEND=postgres requires building with the `postgres` feature")
}

/// Creates the configured cache backend, plus its sweep task when in-memory.
async fn build_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn CacheBackend>, Option<JoinHandle<()>>)> {
    match config.cache_backend {
        CacheBackendKind::Memory => {
            let cache = Arc::new(InMemoryCache::new());
            let handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
            Ok((cache, Some(handle)))
        }
        CacheBackendKind::Redis => Ok((redis_cache(config).await?, None)),
    }
}

#[cfg(feature = "redis")]
async fn redis_cache(config: &Config) -> anyhow::Result<Arc<dyn CacheBackend>> {
    let cache = bookshelf::cache::RedisCache::connect(&config.redis_url()).await?;
    Ok(Arc::new(cache))
}

#[cfg(not(feature = "redis"))]
async fn redis_cache(_config: &Config) -> anyhow::Result<Arc<dyn CacheBackend>> {
    anyhow::bail!("CACHE_BACKEND=redis requires building with the `redis` feature")
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
