// src/services/accounts.rs

//! Registration, login, the caller's own profile and user administration.

use serde::Serialize;
use validator::Validate;

use super::not_found;
use crate::{
    config::Config,
    error::AppError,
    models::user::{
        CreateUserRequest, CurrentUser, LoginRequest, NewUser, ProfileChanges, Role,
        SetRoleRequest, UpdateProfileRequest, UserProfile, UserWithProfile,
    },
    policy,
    repository::UserRepository,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub user_id: i64,
    pub is_staff: bool,
}

/// Resolves the subject of a verified token. A user deleted after the
/// token was issued is no longer authenticated.
pub async fn load_current_user<R>(repo: &R, user_id: i64) -> Result<CurrentUser, AppError>
where
    R: UserRepository + ?Sized,
{
    repo.find_user_with_profile(user_id)
        .await?
        .map(CurrentUser::from)
        .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))
}

async fn create_user<R>(repo: &R, new_user: NewUser) -> Result<UserWithProfile, AppError>
where
    R: UserRepository + ?Sized,
{
    if repo.find_user_by_username(&new_user.username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            new_user.username
        )));
    }

    let user = repo.insert_user(&new_user).await.map_err(|e| match AppError::from(e) {
        // Lost a race with a concurrent registration.
        AppError::Conflict(_) => {
            AppError::Conflict(format!("Username '{}' already exists", new_user.username))
        }
        other => other,
    })?;

    tracing::info!(user_id = user.user.id, username = %user.user.username, "user registered");
    Ok(user)
}

/// Self-service sign-up. Never grants staff or a role.
pub async fn register<R>(repo: &R, req: CreateUserRequest) -> Result<UserWithProfile, AppError>
where
    R: UserRepository + ?Sized,
{
    req.validate()?;

    let password_hash = hash_password(&req.password)?;
    create_user(
        repo,
        NewUser {
            username: req.username,
            password_hash,
            email: req.email,
            is_staff: false,
            role: None,
        },
    )
    .await
}

/// Verifies the credentials and issues a bearer token.
///
/// Unknown user and wrong password produce the same error.
pub async fn login<R>(repo: &R, config: &Config, req: LoginRequest) -> Result<LoginResponse, AppError>
where
    R: UserRepository + ?Sized,
{
    req.validate()?;

    let invalid = || AppError::AuthError("Invalid username or password".to_string());

    let user = repo
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password)? {
        tracing::debug!(username = %req.username, "login rejected");
        return Err(invalid());
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(LoginResponse {
        token,
        token_type: "Bearer",
        user_id: user.id,
        is_staff: user.is_staff,
    })
}

pub async fn me<R>(repo: &R, actor: &CurrentUser) -> Result<UserWithProfile, AppError>
where
    R: UserRepository + ?Sized,
{
    repo.find_user_with_profile(actor.id)
        .await?
        .ok_or_else(|| not_found("User", actor.id))
}

/// Changes the caller's email, date of birth and profile photo.
pub async fn update_me<R>(
    repo: &R,
    actor: &CurrentUser,
    req: UpdateProfileRequest,
) -> Result<UserWithProfile, AppError>
where
    R: UserRepository + ?Sized,
{
    req.validate()?;

    let changes = ProfileChanges {
        email: req.email,
        date_of_birth: req.date_of_birth,
        profile_photo: req.profile_photo,
    };

    repo.update_user_details(actor.id, &changes)
        .await?
        .ok_or_else(|| not_found("User", actor.id))?;

    me(repo, actor).await
}

pub async fn list_users<R>(repo: &R, actor: &CurrentUser) -> Result<Vec<UserWithProfile>, AppError>
where
    R: UserRepository + ?Sized,
{
    policy::require_staff(actor)?;
    Ok(repo.list_users().await?)
}

/// Assigns or clears the role on a user's profile.
pub async fn set_role<R>(
    repo: &R,
    actor: &CurrentUser,
    user_id: i64,
    req: SetRoleRequest,
) -> Result<UserProfile, AppError>
where
    R: UserRepository + ?Sized,
{
    policy::require_staff(actor)?;
    repo.find_user(user_id).await?.ok_or_else(|| not_found("User", user_id))?;

    let profile = repo.set_role(user_id, req.role).await?;
    tracing::info!(
        user_id,
        role = req.role.map(|r| r.as_str()).unwrap_or("none"),
        by = actor.id,
        "role changed"
    );
    Ok(profile)
}

/// Deletes a user with everything they authored. Staff cannot delete
/// their own account here.
pub async fn delete_user<R>(repo: &R, actor: &CurrentUser, user_id: i64) -> Result<(), AppError>
where
    R: UserRepository + ?Sized,
{
    policy::require_staff(actor)?;
    if user_id == actor.id {
        return Err(AppError::BadRequest("You cannot delete your own account.".to_string()));
    }

    if !repo.delete_user(user_id).await? {
        return Err(not_found("User", user_id));
    }
    tracing::info!(user_id, by = actor.id, "user deleted");
    Ok(())
}

/// Creates the bootstrap admin when credentials are configured and the
/// username is still free. Returns whether a user was created.
pub async fn seed_admin<R>(repo: &R, config: &Config) -> Result<bool, AppError>
where
    R: UserRepository + ?Sized,
{
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(false);
    };

    if repo.find_user_by_username(username).await?.is_some() {
        return Ok(false);
    }

    tracing::info!("Seeding admin user: {}", username);
    let password_hash = hash_password(password)?;
    create_user(
        repo,
        NewUser {
            username: username.clone(),
            password_hash,
            email: config.admin_email.clone().unwrap_or_default(),
            is_staff: true,
            role: Some(Role::Admin),
        },
    )
    .await?;

    Ok(true)
}
