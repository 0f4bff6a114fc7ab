// src/handlers/tags.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, repository::SqliteStore, services::blog, utils::extract::AppPath};

pub async fn list_tags(State(store): State<SqliteStore>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::list_tags(&store).await?))
}

/// Posts carrying the tag, matched by exact (case-sensitive) name.
pub async fn posts_by_tag(
    State(store): State<SqliteStore>,
    AppPath(name): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::posts_by_tag(&store, &name).await?))
}
