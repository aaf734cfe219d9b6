//! Book records
//!
//! `Book` is the public shape returned to clients and broadcast to listeners.
//! `StoredBook` pairs it with the store's internal identifier, which never
//! leaves the store and service layers.

use serde::{Deserialize, Serialize};

/// A book as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Business identifier, assigned at creation and never changed
    pub id: String,
    pub title: String,
    pub author: String,
    /// Full `YYYY-MM-DD` date string
    pub published_year: String,
    pub genre: String,
}

/// A book together with its storage-layer identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBook {
    pub storage_id: u64,
    pub book: Book,
}

impl StoredBook {
    /// Strips the internal identifier.
    pub fn into_public(self) -> Book {
        self.book
    }
}

/// A validated creation payload. The store assigns both identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_year: String,
    pub genre: String,
}

impl NewBook {
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            published_year: self.published_year,
            genre: self.genre,
        }
    }
}

// == Book Filter ==
/// Case-insensitive substring predicates on title, author and genre.
///
/// An absent or empty predicate places no constraint on its field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
}

impl BookFilter {
    pub fn new(title: Option<String>, author: Option<String>, genre: Option<String>) -> Self {
        Self {
            title: normalize(title),
            author: normalize(author),
            genre: normalize(genre),
        }
    }

    /// Lowercased title predicate, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    /// Returns true if the book satisfies every supplied predicate.
    pub fn matches(&self, book: &Book) -> bool {
        contains(&book.title, self.title.as_deref())
            && contains(&book.author, self.author.as_deref())
            && contains(&book.genre, self.genre.as_deref())
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(|v| v.to_lowercase())
}

fn contains(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(needle),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gatsby() -> Book {
        Book {
            id: "1".to_string(),
            title: "The Great Gatsby".to_string(),
            author: "F. Scott Fitzgerald".to_string(),
            published_year: "1925-04-10".to_string(),
            genre: "Fiction".to_string(),
        }
    }

    #[test]
    fn test_book_serializes_camel_case() {
        let json = serde_json::to_value(gatsby()).unwrap();
        assert_eq!(json["publishedYear"], "1925-04-10");
        assert!(json.get("published_year").is_none());
        assert!(json.get("storage_id").is_none());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let book = gatsby();
        for needle in ["gatsby", "GATSBY", "Great G"] {
            let filter = BookFilter::new(Some(needle.to_string()), None, None);
            assert!(filter.matches(&book), "{} should match", needle);
        }
        let filter = BookFilter::new(Some("mockingbird".to_string()), None, None);
        assert!(!filter.matches(&book));
    }

    #[test]
    fn test_filter_requires_all_predicates() {
        let book = gatsby();
        let filter = BookFilter::new(None, Some("scott".into()), Some("fiction".into()));
        assert!(filter.matches(&book));

        let filter = BookFilter::new(None, Some("scott".into()), Some("horror".into()));
        assert!(!filter.matches(&book));
    }

    #[test]
    fn test_empty_filter_is_no_constraint() {
        let filter = BookFilter::new(Some(String::new()), None, Some(String::new()));
        assert_eq!(filter, BookFilter::default());
        assert!(filter.matches(&gatsby()));
    }
}
