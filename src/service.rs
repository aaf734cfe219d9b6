//! Book Service
//!
//! Business operations on books. Mediates between the record store, the list
//! cache and the broadcast channel. Store failures are fatal to the operation;
//! cache and broadcast failures are logged and never fail it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::broadcast::{BroadcastError, Broadcaster, NEW_BOOK_EVENT};
use crate::cache::ListCache;
use crate::error::{ApiError, Result, Stage};
use crate::models::{Book, ListParams, NewBook, PagedResult, StoredBook};
use crate::store::{BookRepository, StoreError};

// == Book Service ==
pub struct BookService {
    store: Arc<dyn BookRepository>,
    list_cache: Arc<ListCache>,
    broadcaster: Arc<dyn Broadcaster>,
    op_timeout: Duration,
}

impl BookService {
    // == Constructor ==
    pub fn new(
        store: Arc<dyn BookRepository>,
        list_cache: Arc<ListCache>,
        broadcaster: Arc<dyn Broadcaster>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            store,
            list_cache,
            broadcaster,
            op_timeout,
        }
    }

    // == List ==
    /// Returns one page of books matching the filters, plus totals for pagination.
    ///
    /// Performs no caching itself; see `ListCache` for the read-through layer.
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult> {
        let filter = params.filter();
        let fetch = |e: StoreError| ApiError::infrastructure(Stage::FetchBooks, e);

        let books = self
            .call(self.store.find(&filter, params.skip(), params.limit))
            .await
            .map_err(fetch)?;
        let total = self.call(self.store.count(&filter)).await.map_err(fetch)?;

        Ok(PagedResult::new(
            books.into_iter().map(StoredBook::into_public).collect(),
            total,
            params.page,
            params.limit,
        ))
    }

    // == Get By Id ==
    /// Looks up a book by its business id.
    pub async fn get_by_id(&self, id: &str) -> Result<Book> {
        self.call(self.store.find_by_id(id))
            .await
            .map_err(|e| ApiError::infrastructure(Stage::FetchBook, e))?
            .map(StoredBook::into_public)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    // == Create ==
    /// Persists a validated book, invalidates cached lists and announces it.
    pub async fn create(&self, new_book: NewBook) -> Result<Book> {
        let book = self
            .call(self.store.insert(new_book))
            .await
            .map_err(|e| ApiError::infrastructure(Stage::CreateBook, e))?
            .into_public();

        info!("Created book {}", book.id);

        self.list_cache.invalidate_all().await;
        if let Err(e) = self.announce(&book).await {
            warn!("Failed to broadcast new book {}: {}", book.id, e);
        }

        Ok(book)
    }

    // == Delete ==
    /// Removes a book by its business id and returns it.
    pub async fn delete(&self, id: &str) -> Result<Book> {
        let book = self
            .call(self.store.delete_by_id(id))
            .await
            .map_err(|e| ApiError::infrastructure(Stage::DeleteBook, e))?
            .map(StoredBook::into_public)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        info!("Deleted book {}", book.id);

        self.list_cache.invalidate_all().await;
        Ok(book)
    }

    // == Timeouts ==
    async fn announce(&self, book: &Book) -> std::result::Result<(), BroadcastError> {
        let payload =
            serde_json::to_value(book).map_err(|e| BroadcastError::Serialization(e.to_string()))?;

        match timeout(self.op_timeout, self.broadcaster.broadcast(NEW_BOOK_EVENT, payload)).await
        {
            Ok(result) => result,
            Err(_) => Err(BroadcastError::Timeout(self.timeout_ms())),
        }
    }

    async fn call<T>(
        &self,
        op: impl Future<Output = std::result::Result<T, StoreError>>,
    ) -> std::result::Result<T, StoreError> {
        match timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout_ms())),
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.op_timeout.as_millis() as u64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::models::BookFilter;
    use crate::store::InMemoryBookStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    const OP_TIMEOUT: Duration = Duration::from_millis(200);

    /// Records every broadcast.
    #[derive(Default)]
    struct RecordingBroadcaster {
        events: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl Broadcaster for RecordingBroadcaster {
        async fn broadcast(
            &self,
            event: &str,
            payload: Value,
        ) -> std::result::Result<(), BroadcastError> {
            self.events.lock().unwrap().push((event.to_string(), payload));
            Ok(())
        }
    }

    struct FailingBroadcaster;

    #[async_trait]
    impl Broadcaster for FailingBroadcaster {
        async fn broadcast(&self, _: &str, _: Value) -> std::result::Result<(), BroadcastError> {
            Err(BroadcastError::Unavailable("hub down".into()))
        }
    }

    /// Store whose every call fails.
    struct UnreachableStore;

    #[async_trait]
    impl BookRepository for UnreachableStore {
        async fn find(
            &self,
            _: &BookFilter,
            _: u64,
            _: u64,
        ) -> std::result::Result<Vec<StoredBook>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn count(&self, _: &BookFilter) -> std::result::Result<u64, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn find_by_id(&self, _: &str) -> std::result::Result<Option<StoredBook>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn insert(&self, _: NewBook) -> std::result::Result<StoredBook, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn delete_by_id(
            &self,
            _: &str,
        ) -> std::result::Result<Option<StoredBook>, StoreError> {
            std::future::pending().await
        }
    }

    fn list_cache() -> Arc<ListCache> {
        Arc::new(ListCache::new(
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(30),
            OP_TIMEOUT,
        ))
    }

    fn service_with(broadcaster: Arc<dyn Broadcaster>) -> BookService {
        BookService::new(
            Arc::new(InMemoryBookStore::new()),
            list_cache(),
            broadcaster,
            OP_TIMEOUT,
        )
    }

    fn dune() -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_year: "1965-08-01".to_string(),
            genre: "SciFi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_paginates_with_totals() {
        let service = service_with(Arc::new(RecordingBroadcaster::default()));
        for i in 0..7 {
            let mut book = dune();
            book.title = format!("Dune {}", i);
            service.create(book).await.unwrap();
        }

        let page = service.list(&ListParams::new(1, 5)).await.unwrap();
        assert_eq!(page.books.len(), 5);
        assert_eq!(page.total_books, 7);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 1);

        let page = service.list(&ListParams::new(2, 5)).await.unwrap();
        assert_eq!(page.books.len(), 2);
        assert_eq!(page.books[0].title, "Dune 5");
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let service = service_with(Arc::new(RecordingBroadcaster::default()));
        let page = service.list(&ListParams::new(1, 10)).await.unwrap();
        assert!(page.books.is_empty());
        assert_eq!(page.total_books, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_create_broadcasts_once_without_internal_fields() {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let service = service_with(broadcaster.clone());

        let book = service.create(dune()).await.unwrap();

        let events = broadcaster.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let (name, payload) = &events[0];
        assert_eq!(name, NEW_BOOK_EVENT);
        assert_eq!(payload["id"], book.id.as_str());
        assert_eq!(payload["publishedYear"], "1965-08-01");
        assert!(payload.get("storage_id").is_none());
        assert!(payload.get("storageId").is_none());
    }

    #[tokio::test]
    async fn test_broadcast_failure_does_not_fail_create() {
        let service = service_with(Arc::new(FailingBroadcaster));
        let book = service.create(dune()).await.unwrap();
        assert_eq!(service.get_by_id(&book.id).await.unwrap(), book);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_is_distinct() {
        let service = service_with(Arc::new(RecordingBroadcaster::default()));
        let err = service.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_delete_returns_public_book_then_not_found() {
        let service = service_with(Arc::new(RecordingBroadcaster::default()));
        let book = service.create(dune()).await.unwrap();

        assert_eq!(service.delete(&book.id).await.unwrap(), book);
        assert!(matches!(service.get_by_id(&book.id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.delete(&book.id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_writes_invalidate_tracked_list_keys() {
        let cache = list_cache();
        let service = BookService::new(
            Arc::new(InMemoryBookStore::new()),
            cache.clone(),
            Arc::new(RecordingBroadcaster::default()),
            OP_TIMEOUT,
        );

        let page = service.list(&ListParams::new(1, 10)).await.unwrap();
        cache.put("books:1:10:::", &page).await;
        assert_eq!(cache.tracked_keys().await, 1);

        let book = service.create(dune()).await.unwrap();
        assert!(cache.get("books:1:10:::").await.is_none());

        cache.put("books:1:10:::", &page).await;
        service.delete(&book.id).await.unwrap();
        assert!(cache.get("books:1:10:::").await.is_none());
    }

    #[tokio::test]
    async fn test_store_failures_are_infrastructure_errors() {
        let service = BookService::new(
            Arc::new(UnreachableStore),
            list_cache(),
            Arc::new(RecordingBroadcaster::default()),
            OP_TIMEOUT,
        );

        let err = service.list(&ListParams::new(1, 10)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error fetching books: store unavailable: connection refused"
        );

        let err = service.get_by_id("x").await.unwrap_err();
        assert!(matches!(err, ApiError::Infrastructure { stage: Stage::FetchBook, .. }));

        let err = service.create(dune()).await.unwrap_err();
        assert!(matches!(err, ApiError::Infrastructure { stage: Stage::CreateBook, .. }));
    }

    #[tokio::test]
    async fn test_hanging_store_times_out() {
        let service = BookService::new(
            Arc::new(UnreachableStore),
            list_cache(),
            Arc::new(RecordingBroadcaster::default()),
            OP_TIMEOUT,
        );

        let err = service.delete("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error deleting book: store operation timed out after 200ms"
        );
    }
}
