//! Database repository for user records.
//!
//! Uniqueness of `email` and `github_id` is enforced by the UNIQUE indexes of
//! the `users` table, so creation is a single INSERT that either succeeds or
//! is rejected. There is no check-then-insert.

use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, email, password_hash, github_id, role, created_at, updated_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> ServiceResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// Creates a new user in the database.
    ///
    /// # Returns
    /// The newly created User with all fields populated
    ///
    /// # Errors
    /// `DuplicateEmail` / `DuplicateGithubId` naming the conflicting value.
    async fn create_user(&self, user: CreateUser) -> ServiceResult<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, github_id, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.github_id)
            .bind(&user.role)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| match ServiceError::from(error) {
                ServiceError::DuplicateEmail { .. } => {
                    ServiceError::duplicate_email(user.email.clone().unwrap_or_default())
                }
                ServiceError::DuplicateGithubId { .. } => {
                    ServiceError::duplicate_github_id(user.github_id.clone().unwrap_or_default())
                }
                other => other,
            })
    }

    async fn get_user_by_id(&self, id: &str) -> ServiceResult<Option<User>> {
        self.fetch_one_by("id", id).await
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        self.fetch_one_by("email", email).await
    }

    async fn get_user_by_github_id(&self, github_id: &str) -> ServiceResult<Option<User>> {
        self.fetch_one_by("github_id", github_id).await
    }

    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: &str,
    ) -> ServiceResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ? \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
