// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, CurrentUser, LoginRequest, UpdateProfileRequest},
    repository::SqliteStore,
    services::accounts,
    utils::extract::AppJson,
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it; the profile is
/// created in the same transaction.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(store): State<SqliteStore>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = accounts::register(&store, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(store): State<SqliteStore>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = accounts::login(&store, &config, payload).await?;
    Ok(Json(response))
}

/// The current user with their profile.
pub async fn get_me(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(accounts::me(&store, &user).await?))
}

pub async fn update_me(
    State(store): State<SqliteStore>,
    Extension(user): Extension<CurrentUser>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(accounts::update_me(&store, &user, payload).await?))
}
