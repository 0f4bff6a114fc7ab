// src/handlers/books.rs

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
        book::{CreateBookRequest, UpdateBookRequest},
        user::CurrentUser,
    },
    query::ListQuery,
    repository::{SqliteStore, catalog::BOOK_LIST},
    services::catalog,
    utils::extract::{AppJson, AppPath},
};

/// Lists books.
///
/// Filters: `title`, `publication_year`, `author_id` (alias `author`).
/// `search` matches the title and the author's name.
pub async fn list_books(
    State(store): State<SqliteStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::parse(&BOOK_LIST, &params)?;
    Ok(Json(catalog::list_books(&store, &query).await?))
}

pub async fn get_book(
    State(store): State<SqliteStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_book(&store, id).await?))
}

/// Creates a book. Staff only.
pub async fn create_book(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let book = catalog::create_book(&store, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Serves both PUT and PATCH; omitted fields keep their value.
pub async fn update_book(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::update_book(&store, &user, id, payload).await?))
}

pub async fn delete_book(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_book(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
