// src/models/user.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};
use validator::Validate;

use crate::utils::validation::validate_username;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub email: String,

    /// Site-wide write privilege over the catalog.
    pub is_staff: bool,

    pub date_of_birth: Option<NaiveDate>,

    /// URL of the profile picture.
    pub profile_photo: Option<String>,

    pub date_joined: DateTime<Utc>,
}

/// Roles a profile can hold. A fresh profile holds none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Librarian,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Librarian => "Librarian",
            Role::Member => "Member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Librarian" => Ok(Role::Librarian),
            "Member" => Ok(Role::Member),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Represents the 'user_profiles' table. Exactly one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub role: Option<Role>,
}

// The role column is plain TEXT; decode it through `FromStr`.
impl<'r> FromRow<'r, SqliteRow> for UserProfile {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(UserProfile {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            role: decode_role(row.try_get("role")?)?,
        })
    }
}

/// Parses a stored role column; unknown text is a decode error.
pub fn decode_role(role: Option<String>) -> Result<Option<Role>, sqlx::Error> {
    role.map(|r| r.parse::<Role>())
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })
}

/// A user as returned by the API, with its profile.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<UserProfile>,
}

/// The authenticated caller, loaded fresh on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub profile: Option<UserProfile>,
}

impl From<UserWithProfile> for CurrentUser {
    fn from(value: UserWithProfile) -> Self {
        CurrentUser {
            id: value.user.id,
            username: value.user.username,
            is_staff: value.user.is_staff,
            profile: value.profile,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 3, max = 150, message = "Username length must be between 3 and 150 characters."),
        custom(function = validate_username)
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Maps a present key to `Some`, so `null` (`Some(None)`) differs from an
/// omitted key (`None`, via `#[serde(default)]`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// DTO for the profile form. Omitted fields keep their value; `null` clears
/// the optional ones.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(url, length(max = 500))]
    pub profile_photo: Option<Option<String>>,
}

/// DTO for assigning a role. `null` clears it.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Option<Role>,
}

/// Validated input for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub is_staff: bool,
    /// Role given to the profile created alongside the user.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    /// `Some(None)` clears the column.
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub profile_photo: Option<Option<String>>,
}
