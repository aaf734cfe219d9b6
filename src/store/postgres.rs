//! PostgreSQL record store
//!
//! Books live in a single `books` table. `storage_id` is a `BIGSERIAL`, so
//! ordering by it gives insertion order; `id` is the business identifier.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::{BookRepository, StoreError};
use crate::models::{Book, BookFilter, NewBook, StoredBook};

const BOOK_COLUMNS: &str = "storage_id, id, title, author, published_year, genre";

/// Book records persisted in PostgreSQL.
#[derive(Clone)]
pub struct PostgresBookStore {
    pool: PgPool,
}

impl PostgresBookStore {
    /// Opens a pool against `url` and applies pending migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))?;

        info!(max_connections, "Postgres book store ready");
        Ok(Self::new(pool))
    }

    /// Wraps an existing pool. Migrations must already be applied.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    storage_id: i64,
    id: String,
    title: String,
    author: String,
    published_year: String,
    genre: String,
}

impl From<BookRow> for StoredBook {
    fn from(row: BookRow) -> Self {
        StoredBook {
            storage_id: row.storage_id as u64,
            book: Book {
                id: row.id,
                title: row.title,
                author: row.author,
                published_year: row.published_year,
                genre: row.genre,
            },
        }
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.constraint().unwrap_or("books_id_key").to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// Appends one `strpos(lower(col), needle) > 0` clause per predicate.
///
/// Needles are already lowercased by `BookFilter`. `strpos` keeps `%` and `_`
/// in user input literal, unlike `LIKE`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    let predicates = [
        ("title", filter.title()),
        ("author", filter.author()),
        ("genre", filter.genre()),
    ];
    for (column, needle) in predicates {
        if let Some(needle) = needle {
            qb.push(" AND strpos(lower(");
            qb.push(column);
            qb.push("), ");
            qb.push_bind(needle.to_string());
            qb.push(") > 0");
        }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl BookRepository for PostgresBookStore {
    async fn find(
        &self,
        filter: &BookFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<StoredBook>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(BOOK_COLUMNS);
        qb.push(" FROM books WHERE TRUE");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY storage_id OFFSET ");
        qb.push_bind(to_i64(skip));
        qb.push(" LIMIT ");
        qb.push_bind(to_i64(limit));

        let rows = qb
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(StoredBook::from).collect())
    }

    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books WHERE TRUE");
        push_filter(&mut qb, filter);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(total.max(0) as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StoredBook>, StoreError> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(StoredBook::from))
    }

    async fn insert(&self, book: NewBook) -> Result<StoredBook, StoreError> {
        let sql = format!(
            "INSERT INTO books (id, title, author, published_year, genre) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(book.title)
            .bind(book.author)
            .bind(book.published_year)
            .bind(book.genre)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<StoredBook>, StoreError> {
        let sql = format!("DELETE FROM books WHERE id = $1 RETURNING {}", BOOK_COLUMNS);
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(StoredBook::from))
    }
}
