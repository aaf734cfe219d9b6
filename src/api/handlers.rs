//! API Handlers
//!
//! HTTP request handlers for each book endpoint. Every handler produces a
//! single `Result`, which is turned into exactly one response.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::broadcast::BroadcastHub;
use crate::cache::{CacheBackend, ListCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{validate_new_book, Book, HealthResponse, ListQuery, PagedResult};
use crate::service::BookService;
use crate::store::BookRepository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<BookService>,
    pub list_cache: Arc<ListCache>,
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    /// Wires the service to the given store and cache backend.
    ///
    /// The hub is both the service's broadcaster and the source the
    /// WebSocket endpoint subscribes to.
    pub fn new(
        config: &Config,
        store: Arc<dyn BookRepository>,
        cache: Arc<dyn CacheBackend>,
    ) -> Self {
        let list_cache = Arc::new(ListCache::new(
            cache,
            config.cache_ttl(),
            config.operation_timeout(),
        ));
        let hub = Arc::new(BroadcastHub::new(config.broadcast_capacity));
        let books = Arc::new(BookService::new(
            store,
            list_cache.clone(),
            hub.clone(),
            config.operation_timeout(),
        ));

        Self {
            books,
            list_cache,
            hub,
        }
    }
}

/// Handler for GET /api/books
///
/// Serves from the list cache when possible, otherwise queries the service
/// and caches the page. Malformed query strings are reported as JSON 400s.
pub async fn list_books_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<PagedResult>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let params = query.into_params()?;
    let key = params.cache_key();

    if let Some(cached) = state.list_cache.get(&key).await {
        debug!("Returning cached books for {}", key);
        return Ok(Json(cached));
    }

    let page = state.books.list(&params).await?;
    state.list_cache.put(&key, &page).await;

    Ok(Json(page))
}

/// Handler for GET /api/books/:id
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>> {
    let book = state.books.get_by_id(&id).await?;
    Ok(Json(book))
}

/// Handler for POST /api/books
///
/// Validates the whole payload before the service is invoked.
pub async fn create_book_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>)> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let new_book = validate_new_book(&payload).map_err(ApiError::Validation)?;

    let book = state.books.create(new_book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Handler for DELETE /api/books/:id
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>> {
    let book = state.books.delete(&id).await?;
    Ok(Json(book))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
