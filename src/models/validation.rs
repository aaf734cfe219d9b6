//! Validation contract for book creation payloads.
//!
//! Every violated field produces its own message; checking never stops at
//! the first failure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::NewBook;

static PUBLISHED_YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

const FIELDS: [&str; 4] = ["title", "author", "publishedYear", "genre"];

/// Checks a JSON payload against the contract and builds a `NewBook`.
///
/// Returns the full list of violation messages on failure.
pub fn validate_new_book(payload: &Value) -> Result<NewBook, Vec<String>> {
    let Some(object) = payload.as_object() else {
        return Err(vec!["Book payload must be a JSON object.".to_string()]);
    };

    let mut errors = Vec::new();

    let title = required_string(object, "title", "Title", &mut errors);
    let author = required_string(object, "author", "Author", &mut errors);
    let published_year = required_string(object, "publishedYear", "Published Year", &mut errors)
        .filter(|value| {
            let ok = PUBLISHED_YEAR_PATTERN.is_match(value);
            if !ok {
                errors.push("Published Year must be in YYYY-MM-DD format.".to_string());
            }
            ok
        });
    let genre = required_string(object, "genre", "Genre", &mut errors);

    for key in object.keys().filter(|key| !FIELDS.contains(&key.as_str())) {
        errors.push(format!("\"{}\" is not allowed", key));
    }

    match (title, author, published_year, genre) {
        (Some(title), Some(author), Some(published_year), Some(genre)) if errors.is_empty() => {
            Ok(NewBook {
                title,
                author,
                published_year,
                genre,
            })
        }
        _ => Err(errors),
    }
}

fn required_string(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => {
            errors.push(format!("{} is required.", label));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.push(format!("{} is required.", label));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("{} should be a string.", label));
            None
        }
    }
}
