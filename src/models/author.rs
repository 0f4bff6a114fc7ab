// src/models/author.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{models::book::Book, utils::validation::validate_not_blank};

/// Represents the 'authors' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// An author together with every book they wrote.
#[derive(Debug, Serialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

/// DTO for creating a new author.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAuthorRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name length must be between 1 and 100 chars"),
        custom(function = validate_not_blank)
    )]
    pub name: String,
}

/// DTO for renaming an author.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAuthorRequest {
    #[validate(length(min = 1, max = 100, message = "Name length must be between 1 and 100 chars"))]
    pub name: Option<String>,
}
