use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{classify_insert_error, PgStore};
use crate::error::{AppError, AppResult};

/// Public profile fields, safe to show to any authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Full user record as returned by lookups.
/// The password hash never leaves the store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

/// Registration input. The password arrives in plaintext and is hashed
/// inside the store; it is not echoed back.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Owns user records and credential verification.
#[allow(async_fn_in_trait)]
pub trait UserStore {
    /// Insert a new user with join/last-login timestamps set to now.
    /// Duplicate usernames surface as a conflict from the uniqueness
    /// constraint; there is no pre-check.
    async fn create(&self, new_user: &NewUser) -> AppResult<User>;

    /// Check a username/password pair. Fails with an authentication error
    /// when the user is unknown or the password does not match; the two
    /// cases are indistinguishable to the caller.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<bool>;

    /// Unconditionally set last-login to now. No existence check; unknown
    /// usernames are a no-op.
    async fn touch_login(&self, username: &str) -> AppResult<()>;

    async fn get(&self, username: &str) -> AppResult<User>;

    /// Basic info on all users. An empty store is reported as an
    /// empty-result error, not an empty list.
    async fn list(&self) -> AppResult<Vec<UserProfile>>;
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    password_hash: String,
}

impl UserStore for PgStore {
    async fn create(&self, new_user: &NewUser) -> AppResult<User> {
        let password_hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, phone, join_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING username, first_name, last_name, phone, join_at, last_login_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            classify_insert_error(
                e,
                &format!("username already taken: {}", new_user.username),
                "registration referenced an unknown row",
            )
        })?;

        tracing::info!(username = %user.username, "user registered");
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<bool> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            tracing::warn!("authentication failed: unknown user");
            return Err(AppError::auth("invalid username/password"));
        };

        if !bcrypt::verify(password, &row.password_hash)? {
            tracing::warn!("authentication failed: password mismatch");
            return Err(AppError::auth("invalid username/password"));
        }

        Ok(true)
    }

    async fn touch_login(&self, username: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, username: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, first_name, last_name, phone, join_at, last_login_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| AppError::not_found(format!("username does not exist: {}", username)))
    }

    async fn list(&self) -> AppResult<Vec<UserProfile>> {
        let users = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT username, first_name, last_name, phone
            FROM users
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if users.is_empty() {
            return Err(AppError::empty("no users found"));
        }
        Ok(users)
    }
}
