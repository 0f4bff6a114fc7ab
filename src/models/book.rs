// src/models/book.rs

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

/// Represents the 'books' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub publication_year: i32,
    pub author_id: i64,
}

/// DTO for creating a new book.
///
/// `author` is accepted as an alias of `author_id`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"),
        custom(function = validate_not_blank)
    )]
    pub title: String,

    /// Checked against the current year by the book service.
    pub publication_year: i32,

    #[serde(alias = "author")]
    pub author_id: i64,
}

/// DTO for updating a book. Omitted fields keep their value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"))]
    pub title: Option<String>,

    #[serde(alias = "author")]
    pub author_id: Option<i64>,

    /// Write-once field. Captured only to detect its presence, `null` included.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub publication_year: Option<serde_json::Value>,
}

/// Maps any present value (even `null`) to `Some`, so that only a missing
/// key yields `None` through `#[serde(default)]`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Validated input for inserting a book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub publication_year: i32,
    pub author_id: i64,
}

/// Field changes for an existing book; `publication_year` is never changed.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_year_presence_is_detected() {
        let missing: UpdateBookRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(missing.publication_year.is_none());

        let null: UpdateBookRequest =
            serde_json::from_str(r#"{"publication_year": null}"#).unwrap();
        assert_eq!(null.publication_year, Some(serde_json::Value::Null));

        let value: UpdateBookRequest =
            serde_json::from_str(r#"{"publication_year": 1949}"#).unwrap();
        assert!(value.publication_year.is_some());
    }

    #[test]
    fn author_alias_is_accepted() {
        let req: CreateBookRequest =
            serde_json::from_str(r#"{"title": "1984", "publication_year": 1949, "author": 3}"#)
                .unwrap();
        assert_eq!(req.author_id, 3);
    }
}
