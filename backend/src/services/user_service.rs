//! Credential store: local accounts and their password hashes.
//!
//! Passwords are hashed exactly when they are assigned (account creation or
//! `set_password`). No other path writes `password_hash`, so reading and
//! re-saving a user never re-hashes.

use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;

pub struct UserService<'a> {
    /// Backing user store
    store: &'a dyn UserStore,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    pub fn new(store: &'a dyn UserStore) -> Self {
        Self { store }
    }

    /// Creates a local user identified by email and password.
    ///
    /// # Errors
    /// - `Validation` if email or password is empty
    /// - `DuplicateEmail` if the email is taken (including a lost race)
    pub async fn create_local(&self, email: &str, password: &str) -> ServiceResult<User> {
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::validation("Credentials missing"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .create_user(CreateUser::local(email, password_hash))
            .await?;

        tracing::info!("Created local user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        self.store.get_user_by_email(email).await
    }

    /// Checks a password against the user's stored hash.
    ///
    /// Users without a password (GitHub-only accounts) never match.
    pub fn verify_password(&self, user: &User, password: &str) -> bool {
        match &user.password_hash {
            Some(password_hash) => verify_password(password, password_hash),
            None => false,
        }
    }

    /// Assigns a new password, re-hashing it.
    ///
    /// # Errors
    /// - `Validation` if the password is empty
    /// - `NotFound` if the user does not exist
    pub async fn set_password(&self, user_id: &str, password: &str) -> ServiceResult<User> {
        let password_hash = hash_password(password)?;
        self.store
            .update_password_hash(user_id, &password_hash)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::repositories::user_repository::UserRepository;

    async fn store() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_then_find_verifies_password() {
        let store = store().await;
        let service = UserService::new(&store);

        service.create_local("a@x.com", "hunter2").await.unwrap();
        let user = service.find_by_email("a@x.com").await.unwrap().unwrap();

        assert!(service.verify_password(&user, "hunter2"));
        assert!(!service.verify_password(&user, "hunter3"));
        assert_ne!(user.password_hash.as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn test_duplicate_signup_leaves_first_record() {
        let store = store().await;
        let service = UserService::new(&store);

        let first = service.create_local("a@x.com", "p1").await.unwrap();
        let err = service.create_local("a@x.com", "p2").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail { .. }));

        let stored = service.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert!(service.verify_password(&stored, "p1"));
        assert!(!service.verify_password(&stored, "p2"));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = store().await;
        let service = UserService::new(&store);

        for (email, password) in [("", "pw"), ("a@x.com", "")] {
            let err = service.create_local(email, password).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }));
        }
        assert!(service.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_federated_user_without_password_fails_closed() {
        let store = store().await;
        let user = store
            .create_user(CreateUser::federated("gh1", None))
            .await
            .unwrap();
        let service = UserService::new(&store);

        assert!(!service.verify_password(&user, ""));
        assert!(!service.verify_password(&user, "anything"));
    }

    #[tokio::test]
    async fn test_set_password_rehashes() {
        let store = store().await;
        let service = UserService::new(&store);
        let user = service.create_local("a@x.com", "old").await.unwrap();

        let updated = service.set_password(&user.id, "new").await.unwrap();
        assert_ne!(updated.password_hash, user.password_hash);
        assert!(service.verify_password(&updated, "new"));
        assert!(!service.verify_password(&updated, "old"));

        let err = service.set_password("missing", "x").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reads_do_not_touch_hash() {
        let store = store().await;
        let service = UserService::new(&store);
        let user = service.create_local("a@x.com", "pw").await.unwrap();

        let first = service.find_by_email("a@x.com").await.unwrap().unwrap();
        let second = service.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(first.password_hash, user.password_hash);
        assert_eq!(second.password_hash, user.password_hash);
    }
}
