// src/repository/accounts.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, Row, SqliteConnection};

use super::{RepoResult, SqliteStore, UserRepository};
use crate::models::user::{
    NewUser, ProfileChanges, Role, User, UserProfile, UserWithProfile, decode_role,
};

const USER_COLUMNS: &str =
    "id, username, password, email, is_staff, date_of_birth, profile_photo, date_joined";

/// Post-create hook for users: gives the new user its profile.
///
/// Runs on the insert transaction, so a user never exists without one.
async fn create_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    role: Option<Role>,
) -> RepoResult<UserProfile> {
    sqlx::query_as::<_, UserProfile>(
        "INSERT INTO user_profiles (user_id, role) VALUES (?, ?) RETURNING id, user_id, role",
    )
    .bind(user_id)
    .bind(role.map(|r| r.as_str()))
    .fetch_one(&mut *conn)
    .await
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn find_user(&self, id: i64) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_with_profile(&self, id: i64) -> RepoResult<Option<UserWithProfile>> {
        let Some(user) = self.find_user(id).await? else {
            return Ok(None);
        };

        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, user_id, role FROM user_profiles WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Some(UserWithProfile { user, profile }))
    }

    async fn list_users(&self) -> RepoResult<Vec<UserWithProfile>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.password, u.email, u.is_staff, u.date_of_birth,
                   u.profile_photo, u.date_joined,
                   p.id AS profile_id, p.role AS profile_role
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            ORDER BY u.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> RepoResult<UserWithProfile> {
                let user = User::from_row(row)?;
                let profile_id: Option<i64> = row.try_get("profile_id")?;
                let profile = match profile_id {
                    Some(id) => Some(UserProfile {
                        id,
                        user_id: user.id,
                        role: decode_role(row.try_get("profile_role")?)?,
                    }),
                    None => None,
                };
                Ok(UserWithProfile { user, profile })
            })
            .collect()
    }

    async fn insert_user(&self, new_user: &NewUser) -> RepoResult<UserWithProfile> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, email, is_staff, date_joined)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.email)
        .bind(new_user.is_staff)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let profile = create_profile(&mut tx, user.id, new_user.role).await?;

        tx.commit().await?;

        tracing::debug!(user_id = user.id, "user and profile created");
        Ok(UserWithProfile {
            user,
            profile: Some(profile),
        })
    }

    async fn update_user_details(&self, id: i64, changes: &ProfileChanges) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE(?, email),
                date_of_birth = CASE WHEN ? THEN ? ELSE date_of_birth END,
                profile_photo = CASE WHEN ? THEN ? ELSE profile_photo END
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(changes.email.as_deref())
        .bind(changes.date_of_birth.is_some())
        .bind(changes.date_of_birth.flatten())
        .bind(changes.profile_photo.is_some())
        .bind(changes.profile_photo.as_ref().and_then(Option::as_deref))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_role(&self, user_id: i64, role: Option<Role>) -> RepoResult<UserProfile> {
        // Upsert: also repairs a user whose profile row went missing.
        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, role)
            VALUES (?, ?)
            ON CONFLICT (user_id) DO UPDATE SET role = excluded.role
            RETURNING id, user_id, role
            "#,
        )
        .bind(user_id)
        .bind(role.map(|r| r.as_str()))
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_user(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }
}
