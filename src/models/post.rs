use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,

    /// Set once at creation.
    pub published_date: DateTime<Utc>,

    pub author_id: i64,

    /// Names of the associated tags, sorted.
    /// Not a column; filled in by the repository.
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"),
        custom(function = validate_not_blank)
    )]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,

    /// Comma separated tag names, e.g. "rust, web".
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub tags: String,
}

/// DTO for updating a post. Omitted fields keep their value;
/// `tags` replaces the whole set when present.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"))]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: Option<String>,

    #[validate(length(max = 1000))]
    pub tags: Option<String>,
}

/// Validated input for inserting a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub published_date: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some` replaces the associated tags, `Some(vec![])` clears them.
    pub tags: Option<Vec<String>>,
}
