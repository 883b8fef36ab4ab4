//! Persistence seams for users and sessions.
//!
//! Services only talk to the `UserStore` and `SessionStore` traits. The SQLite
//! implementations live in the submodules; tests swap in their own stores.

use crate::database::models::{CreateUser, Session, User};
use crate::errors::ServiceResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod session_repository;
pub mod user_repository;

/// Uniqueness-constrained user storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Atomically inserts a user.
    ///
    /// Fails with `DuplicateEmail` or `DuplicateGithubId` when the store's
    /// unique indexes reject the row, including when a concurrent insert won.
    async fn create_user(&self, user: CreateUser) -> ServiceResult<User>;

    async fn get_user_by_id(&self, id: &str) -> ServiceResult<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>>;

    async fn get_user_by_github_id(&self, github_id: &str) -> ServiceResult<Option<User>>;

    /// Replaces the stored password hash. Returns `None` if the user is gone.
    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: &str,
    ) -> ServiceResult<Option<User>>;
}

/// Key-value store of server-side sessions keyed by opaque id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> ServiceResult<()>;

    async fn get_session(&self, id: &str) -> ServiceResult<Option<Session>>;

    /// Removes a session. Returns whether a record existed.
    async fn delete_session(&self, id: &str) -> ServiceResult<bool>;

    /// Removes every session that expired at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> ServiceResult<u64>;
}
