// src/handlers/authors.rs

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
        author::{CreateAuthorRequest, UpdateAuthorRequest},
        user::CurrentUser,
    },
    query::ListQuery,
    repository::{SqliteStore, catalog::AUTHOR_LIST},
    services::catalog,
    utils::extract::{AppJson, AppPath},
};

/// Lists authors. Supports `filter[name]`, `search` and `ordering`.
pub async fn list_authors(
    State(store): State<SqliteStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::parse(&AUTHOR_LIST, &params)?;
    Ok(Json(catalog::list_authors(&store, &query).await?))
}

/// An author with their books.
pub async fn get_author(
    State(store): State<SqliteStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_author(&store, id).await?))
}

pub async fn create_author(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateAuthorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let author = catalog::create_author(&store, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn update_author(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateAuthorRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::update_author(&store, &user, id, payload).await?))
}

pub async fn delete_author(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_author(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
