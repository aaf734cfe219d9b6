//! In-Memory Book Store
//!
//! Document store held in process memory. Records are keyed by a monotonically
//! increasing storage id, so iteration order is insertion order.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookRepository, StoreError};
use crate::models::{BookFilter, NewBook, StoredBook};

#[derive(Debug, Default)]
struct Records {
    /// Storage id -> record
    by_storage_id: BTreeMap<u64, StoredBook>,
    /// Business id -> storage id
    index: HashMap<String, u64>,
    next_storage_id: u64,
}

// == In-Memory Book Store ==
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    records: RwLock<Records>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_storage_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BookRepository for InMemoryBookStore {
    async fn find(
        &self,
        filter: &BookFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<StoredBook>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .by_storage_id
            .values()
            .filter(|stored| filter.matches(&stored.book))
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError> {
        let records = self.records.read().await;
        let count = records
            .by_storage_id
            .values()
            .filter(|stored| filter.matches(&stored.book))
            .count();
        Ok(count as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StoredBook>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .index
            .get(id)
            .and_then(|storage_id| records.by_storage_id.get(storage_id))
            .cloned())
    }

    async fn insert(&self, book: NewBook) -> Result<StoredBook, StoreError> {
        let mut records = self.records.write().await;

        let id = Uuid::new_v4().to_string();
        if records.index.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }

        records.next_storage_id += 1;
        let storage_id = records.next_storage_id;
        let stored = StoredBook {
            storage_id,
            book: book.into_book(id.clone()),
        };

        records.index.insert(id, storage_id);
        records.by_storage_id.insert(storage_id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<StoredBook>, StoreError> {
        let mut records = self.records.write().await;
        let Some(storage_id) = records.index.remove(id) else {
            return Ok(None);
        };
        Ok(records.by_storage_id.remove(&storage_id))
    }
}
