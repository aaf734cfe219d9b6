//! Error types for the book API
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Stage ==
/// Service operation an infrastructure failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchBooks,
    FetchBook,
    CreateBook,
    DeleteBook,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::FetchBooks => "fetching books",
            Stage::FetchBook => "fetching book by ID",
            Stage::CreateBook => "creating book",
            Stage::DeleteBook => "deleting book",
        };
        f.write_str(label)
    }
}

// == API Error Enum ==
/// Unified error type surfaced by the service and handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Payload failed the validation contract, one message per violation
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Malformed request outside the book payload (query string, body shape)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Referenced book does not exist
    #[error("Book not found: {0}")]
    NotFound(String),

    /// Store unreachable or query failed
    #[error("Error {stage}: {cause}")]
    Infrastructure { stage: Stage, cause: String },
}

impl ApiError {
    pub fn infrastructure(stage: Stage, cause: impl std::fmt::Display) -> Self {
        ApiError::Infrastructure {
            stage,
            cause: cause.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": "Book not found" })),
            ApiError::Infrastructure { .. } => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the book API.
pub type Result<T> = std::result::Result<T, ApiError>;
