// src/models/library.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{models::book::Book, utils::validation::validate_not_blank};

/// Represents the 'libraries' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Library {
    pub id: i64,
    pub name: String,
}

/// Represents the 'librarians' table. At most one row per library.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Librarian {
    pub id: i64,
    pub name: String,
    pub library_id: i64,
}

/// A library with its holdings and librarian.
#[derive(Debug, Serialize)]
pub struct LibraryDetail {
    #[serde(flatten)]
    pub library: Library,
    pub books: Vec<Book>,
    pub librarian: Option<Librarian>,
}

/// DTO for creating a library, optionally stocked with existing books.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLibraryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name length must be between 1 and 100 chars"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    #[serde(default)]
    pub book_ids: Vec<i64>,
}

/// DTO for updating a library. `book_ids`, when given, replaces the holdings.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLibraryRequest {
    #[validate(length(min = 1, max = 100, message = "Name length must be between 1 and 100 chars"))]
    pub name: Option<String>,

    pub book_ids: Option<Vec<i64>>,
}

/// DTO for assigning (or renaming) the librarian of a library.
#[derive(Debug, Deserialize, Validate)]
pub struct AssignLibrarianRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name length must be between 1 and 100 chars"),
        custom(function = validate_not_blank)
    )]
    pub name: String,
}
