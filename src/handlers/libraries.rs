// src/handlers/libraries.rs

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
        library::{AssignLibrarianRequest, CreateLibraryRequest, UpdateLibraryRequest},
        user::CurrentUser,
    },
    query::ListQuery,
    repository::{SqliteStore, catalog::LIBRARY_LIST},
    services::catalog,
    utils::extract::{AppJson, AppPath},
};

pub async fn list_libraries(
    State(store): State<SqliteStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::parse(&LIBRARY_LIST, &params)?;
    Ok(Json(catalog::list_libraries(&store, &query).await?))
}

/// A library with its books and librarian.
pub async fn get_library(
    State(store): State<SqliteStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_library(&store, id).await?))
}

pub async fn create_library(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateLibraryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let library = catalog::create_library(&store, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(library)))
}

pub async fn update_library(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateLibraryRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::update_library(&store, &user, id, payload).await?))
}

pub async fn delete_library(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_library(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds a book to the holdings. Adding it twice is harmless.
pub async fn add_book(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath((id, book_id)): AppPath<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::add_library_book(&store, &user, id, book_id).await?))
}

pub async fn remove_book(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath((id, book_id)): AppPath<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    catalog::remove_library_book(&store, &user, id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_librarian(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<AssignLibrarianRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::assign_librarian(&store, &user, id, payload).await?))
}

pub async fn remove_librarian(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::remove_librarian(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
