//! Bookshelf - A book catalogue REST API
//!
//! CRUD over book records with a short-lived cache for list pages and live
//! `newBook` notifications over WebSocket.

pub mod api;
pub mod broadcast;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::BookService;
pub use tasks::spawn_cleanup_task;
