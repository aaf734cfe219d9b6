//! API Routes
//!
//! Configures the Axum router with all book API endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_book_handler, delete_book_handler, get_book_handler, health_handler,
    list_books_handler, AppState,
};
use crate::broadcast::socket_handler;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs every request
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/books", get(list_books_handler).post(create_book_handler))
        .route(
            "/api/books/:id",
            get(get_book_handler).delete(delete_book_handler),
        )
        .route("/ws", get(socket_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
