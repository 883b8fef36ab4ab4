//! Links external GitHub identities to local users.
//!
//! A returning identity gets its existing user back unchanged; the email is
//! not re-synced from the provider. A new identity gets a fresh password-less
//! user. Email collisions with an existing account are reported, never merged.

use crate::auth::models::GithubProfile;
use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;

pub struct IdentityService<'a> {
    store: &'a dyn UserStore,
}

impl<'a> IdentityService<'a> {
    pub fn new(store: &'a dyn UserStore) -> Self {
        Self { store }
    }

    /// Returns the user linked to `profile`, creating it on first sight.
    ///
    /// # Errors
    /// - `DuplicateEmail` if the profile's email belongs to another user
    /// - `LinkingFailure` for any other store failure
    pub async fn resolve_or_create(&self, profile: &GithubProfile) -> ServiceResult<User> {
        if profile.github_id.is_empty() {
            return Err(ServiceError::linking_failure("GitHub profile has no id"));
        }

        if let Some(user) = self.find(&profile.github_id).await? {
            return Ok(user);
        }

        let new_user = CreateUser::federated(&profile.github_id, profile.email.clone());
        match self.store.create_user(new_user).await {
            Ok(user) => {
                tracing::info!(
                    "Linked GitHub identity {} to new user {}",
                    profile.github_id,
                    user.id
                );
                Ok(user)
            }
            // Another callback for the same identity inserted first.
            Err(ServiceError::DuplicateGithubId { .. }) => {
                self.find(&profile.github_id).await?.ok_or_else(|| {
                    ServiceError::linking_failure("GitHub identity vanished after conflict")
                })
            }
            Err(e @ ServiceError::DuplicateEmail { .. }) => {
                tracing::warn!(
                    "GitHub identity {} collides with an existing email",
                    profile.github_id
                );
                Err(e)
            }
            Err(e) => Err(ServiceError::linking_failure(e.to_string())),
        }
    }

    async fn find(&self, github_id: &str) -> ServiceResult<Option<User>> {
        self.store
            .get_user_by_github_id(github_id)
            .await
            .map_err(|e| ServiceError::linking_failure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::repositories::user_repository::UserRepository;
    use crate::services::user_service::UserService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hides existing GitHub links from the first `stale_lookups` reads, the
    /// way a concurrent callback's insert is invisible until it commits.
    struct LaggingStore {
        inner: UserRepository,
        stale_lookups: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for LaggingStore {
        async fn create_user(&self, user: CreateUser) -> ServiceResult<User> {
            self.inner.create_user(user).await
        }

        async fn get_user_by_id(&self, id: &str) -> ServiceResult<Option<User>> {
            self.inner.get_user_by_id(id).await
        }

        async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
            self.inner.get_user_by_email(email).await
        }

        async fn get_user_by_github_id(&self, github_id: &str) -> ServiceResult<Option<User>> {
            let stale = self
                .stale_lookups
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if stale {
                return Ok(None);
            }
            self.inner.get_user_by_github_id(github_id).await
        }

        async fn update_password_hash(
            &self,
            id: &str,
            password_hash: &str,
        ) -> ServiceResult<Option<User>> {
            self.inner.update_password_hash(id, password_hash).await
        }
    }

    async fn lagging_store_with_winner(stale_lookups: usize) -> (Database, LaggingStore, User) {
        let (db, inner) = store().await;
        let winner = inner
            .create_user(CreateUser::federated("gh1", None))
            .await
            .unwrap();
        let store = LaggingStore {
            inner,
            stale_lookups: AtomicUsize::new(stale_lookups),
        };
        (db, store, winner)
    }

    async fn store() -> (Database, UserRepository) {
        let db = Database::in_memory().await.unwrap();
        let store = UserRepository::new(db.pool().clone());
        (db, store)
    }

    fn profile(github_id: &str, email: Option<&str>) -> GithubProfile {
        GithubProfile {
            github_id: github_id.to_string(),
            email: email.map(str::to_string),
        }
    }

    async fn count_users(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let (db, store) = store().await;
        let service = IdentityService::new(&store);
        let gh = profile("gh1", Some("b@x.com"));

        let first = service.resolve_or_create(&gh).await.unwrap();
        let second = service.resolve_or_create(&gh).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(count_users(&db).await, 1);
        assert_eq!(first.email.as_deref(), Some("b@x.com"));
        assert_eq!(first.role, "user");
        assert!(first.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_repeat_login_does_not_resync_email() {
        let (_db, store) = store().await;
        let service = IdentityService::new(&store);

        let created = service
            .resolve_or_create(&profile("gh1", Some("old@x.com")))
            .await
            .unwrap();
        let again = service
            .resolve_or_create(&profile("gh1", Some("new@x.com")))
            .await
            .unwrap();

        assert_eq!(again.id, created.id);
        assert_eq!(again.email.as_deref(), Some("old@x.com"));
    }

    #[tokio::test]
    async fn test_profile_without_email() {
        let (_db, store) = store().await;
        let service = IdentityService::new(&store);

        let user = service
            .resolve_or_create(&profile("gh1", None))
            .await
            .unwrap();
        assert_eq!(user.email, None);
        assert_eq!(user.github_id.as_deref(), Some("gh1"));
    }

    #[tokio::test]
    async fn test_email_collision_with_local_user_fails() {
        let (db, store) = store().await;
        UserService::new(&store)
            .create_local("b@x.com", "pw")
            .await
            .unwrap();
        let service = IdentityService::new(&store);

        let err = service
            .resolve_or_create(&profile("gh1", Some("b@x.com")))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::DuplicateEmail { .. }));
        assert_eq!(count_users(&db).await, 1);
    }

    #[tokio::test]
    async fn test_lost_insert_race_returns_winner() {
        let (db, store, winner) = lagging_store_with_winner(1).await;
        let service = IdentityService::new(&store);

        let user = service
            .resolve_or_create(&profile("gh1", Some("c@x.com")))
            .await
            .unwrap();

        assert_eq!(user.id, winner.id);
        assert_eq!(user.email, None);
        assert_eq!(count_users(&db).await, 1);
    }

    #[tokio::test]
    async fn test_conflict_without_readable_winner_is_linking_failure() {
        let (db, store, _winner) = lagging_store_with_winner(2).await;
        let service = IdentityService::new(&store);

        let err = service
            .resolve_or_create(&profile("gh1", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::LinkingFailure { .. }));
        assert_eq!(count_users(&db).await, 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_linking_failure() {
        let (db, store) = store().await;
        let service = IdentityService::new(&store);
        db.close().await;

        let err = service
            .resolve_or_create(&profile("gh1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LinkingFailure { .. }));
    }
}
