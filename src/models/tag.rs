// src/models/tag.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'tags' table. Names are unique.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
