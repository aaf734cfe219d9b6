//! Domain records and the DTOs used for serializing/deserializing
//! HTTP request and response bodies.

pub mod book;
pub mod requests;
pub mod responses;
pub mod validation;

#[cfg(test)]
mod property_tests;

// Re-export commonly used types
pub use book::{Book, BookFilter, NewBook, StoredBook};
pub use requests::{ListParams, ListQuery};
pub use responses::{HealthResponse, PagedResult};
pub use validation::validate_new_book;
