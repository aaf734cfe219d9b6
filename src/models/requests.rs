//! Request DTOs for the book API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

use crate::error::ApiError;
use crate::models::BookFilter;

/// Default page when `page` is omitted.
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size when `limit` is omitted.
pub const DEFAULT_LIMIT: u64 = 10;

/// Query string for the list operation (GET /api/books)
///
/// # Fields
/// - `page`: 1-based page number (default 1)
/// - `limit`: page size (default 10)
/// - `title`, `author`, `genre`: optional case-insensitive substring filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Validated list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl ListQuery {
    /// Applies defaults and rejects page or limit below 1.
    pub fn into_params(self) -> Result<ListParams, ApiError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if page < 1 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }
        if limit < 1 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }
        Ok(ListParams {
            page,
            limit,
            title: self.title.filter(|v| !v.is_empty()),
            author: self.author.filter(|v| !v.is_empty()),
            genre: self.genre.filter(|v| !v.is_empty()),
        })
    }
}

impl ListParams {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            title: None,
            author: None,
            genre: None,
        }
    }

    /// Number of matching records to pass over before this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn filter(&self) -> BookFilter {
        BookFilter::new(self.title.clone(), self.author.clone(), self.genre.clone())
    }

    /// Composite key for the list cache: `books:{page}:{limit}:{title}:{author}:{genre}`.
    pub fn cache_key(&self) -> String {
        format!(
            "books:{}:{}:{}:{}:{}",
            self.page,
            self.limit,
            self.title.as_deref().unwrap_or_default(),
            self.author.as_deref().unwrap_or_default(),
            self.genre.as_deref().unwrap_or_default(),
        )
    }
}
