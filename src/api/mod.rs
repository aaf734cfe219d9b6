//! API Module
//!
//! HTTP handlers and routing for the book REST API.
//!
//! # Endpoints
//! - `GET /api/books` - List books with pagination and filters
//! - `GET /api/books/:id` - Fetch one book by id
//! - `POST /api/books` - Create a book
//! - `DELETE /api/books/:id` - Delete a book by id
//! - `GET /ws` - Live `newBook` events over WebSocket
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
