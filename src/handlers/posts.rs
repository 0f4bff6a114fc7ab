// src/handlers/posts.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        post::{CreatePostRequest, UpdatePostRequest},
        user::CurrentUser,
    },
    query::ListQuery,
    repository::{SqliteStore, blog::POST_LIST},
    services::blog,
    utils::extract::{AppJson, AppPath},
};

/// Lists posts, newest first by default.
/// `search` matches title, content and tag names.
pub async fn list_posts(
    State(store): State<SqliteStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::parse(&POST_LIST, &params)?;
    Ok(Json(blog::list_posts(&store, &query).await?))
}

pub async fn get_post(
    State(store): State<SqliteStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::get_post(&store, id).await?))
}

/// Creates a post authored by the caller.
/// `tags` is a comma separated list of names.
pub async fn create_post(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = blog::create_post(&store, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Author only.
pub async fn update_post(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::update_post(&store, &user, id, payload).await?))
}

/// Author only.
pub async fn delete_post(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    blog::delete_post(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
