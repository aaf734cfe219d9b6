//! Record Store Module
//!
//! Persistence contract for book records, the in-process store, and the
//! PostgreSQL store behind the `postgres` feature.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BookFilter, NewBook, StoredBook};

pub use memory::InMemoryBookStore;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresBookStore;

/// Failures raised by a record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Store reached but the query failed
    #[error("store query failed: {0}")]
    Query(String),

    /// Call did not finish within the operation timeout
    #[error("store operation timed out after {0}ms")]
    Timeout(u64),

    /// Business identifier already taken
    #[error("duplicate book id: {0}")]
    Duplicate(String),
}

/// Persists and queries book records.
///
/// Implementations assign both identifiers on insert: the business `id`
/// exposed to clients and the internal storage id.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Returns up to `limit` matching records after skipping `skip`, in insertion order.
    async fn find(
        &self,
        filter: &BookFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<StoredBook>, StoreError>;

    /// Counts every record matching the filter.
    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError>;

    /// Looks up a record by business id.
    async fn find_by_id(&self, id: &str) -> Result<Option<StoredBook>, StoreError>;

    async fn insert(&self, book: NewBook) -> Result<StoredBook, StoreError>;

    /// Removes a record by business id, returning it if it existed.
    async fn delete_by_id(&self, id: &str) -> Result<Option<StoredBook>, StoreError>;
}
