// src/handlers/comments.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{comment::CommentRequest, user::CurrentUser},
    query::ListQuery,
    repository::{SqliteStore, blog::COMMENT_LIST},
    services::blog,
    utils::extract::{AppJson, AppPath},
};

/// Comments on a post, oldest first by default.
pub async fn list_comments(
    State(store): State<SqliteStore>,
    AppPath(post_id): AppPath<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::parse(&COMMENT_LIST, &params)?;
    Ok(Json(blog::list_comments(&store, post_id, &query).await?))
}

pub async fn get_comment(
    State(store): State<SqliteStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::get_comment(&store, id).await?))
}

pub async fn create_comment(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(post_id): AppPath<i64>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = blog::create_comment(&store, &user, post_id, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::update_comment(&store, &user, id, payload).await?))
}

pub async fn delete_comment(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    blog::delete_comment(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
