//! Response DTOs for the book API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Response body for the list operation (GET /api/books)
///
/// Cached verbatim as JSON by the list cache, hence `Deserialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub books: Vec<Book>,
    /// Count of all matching books, not just this page
    pub total_books: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl PagedResult {
    /// Builds a page, deriving `total_pages` as `ceil(total_books / limit)`.
    pub fn new(books: Vec<Book>, total_books: u64, page: u64, limit: u64) -> Self {
        Self {
            books,
            total_books,
            total_pages: total_pages(total_books, limit),
            current_page: page,
        }
    }
}

pub fn total_pages(total_books: u64, limit: u64) -> u64 {
    total_books.div_ceil(limit.max(1))
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
