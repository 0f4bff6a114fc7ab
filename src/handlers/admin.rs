// src/handlers/admin.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::user::{CurrentUser, SetRoleRequest},
    repository::SqliteStore,
    services::accounts,
    utils::extract::{AppJson, AppPath},
};

/// Lists all users with their profiles, newest first.
/// Staff only.
pub async fn list_users(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(accounts::list_users(&store, &user).await?))
}

/// Sets or clears the role of a user.
/// Staff only.
pub async fn set_role(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(accounts::set_role(&store, &user, id, payload).await?))
}

/// Deletes a user.
/// Staff only; not their own account.
pub async fn delete_user(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    accounts::delete_user(&store, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
