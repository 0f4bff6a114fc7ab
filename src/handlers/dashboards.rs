// src/handlers/dashboards.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::user::CurrentUser,
    repository::SqliteStore,
    services::dashboards,
};

pub async fn admin(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(dashboards::admin(&store, &user).await?))
}

pub async fn librarian(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(dashboards::librarian(&store, &user).await?))
}

pub async fn member(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(dashboards::member(&store, &user).await?))
}
