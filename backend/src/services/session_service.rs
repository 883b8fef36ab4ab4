//! Session authority: issues, validates and destroys server-side sessions.
//!
//! A session id is a random opaque string with no payload. All state lives in
//! the `SessionStore`; the id is only a lookup key.

use crate::database::models::Session;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::SessionStore;
use crate::utils::generate_random_string::{SESSION_ID_LENGTH, generate_random_string};
use chrono::{DateTime, Duration, Utc};

pub struct SessionService<'a> {
    store: &'a dyn SessionStore,
    ttl: Duration,
}

impl<'a> SessionService<'a> {
    pub fn new(store: &'a dyn SessionStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Starts a session for `user_id` and returns its opaque id.
    ///
    /// # Errors
    /// - `Database` if the lifetime overflows the clock or the insert fails
    pub async fn create(&self, user_id: &str) -> ServiceResult<String> {
        // Whole seconds, matching the store's resolution.
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_else(Utc::now);
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("Session lifetime {} is out of range", self.ttl))?;
        let session = Session {
            id: generate_random_string(SESSION_ID_LENGTH),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at,
        };

        self.store.insert_session(&session).await?;
        tracing::debug!("Session created for user {}", user_id);
        Ok(session.id)
    }

    /// Resolves a session id to its user id.
    ///
    /// # Errors
    /// - `Unauthorized` if the session is unknown or expired
    /// - `Database` if the store cannot be read
    pub async fn validate(&self, session_id: &str) -> ServiceResult<String> {
        if session_id.is_empty() {
            return Err(ServiceError::Unauthorized);
        }

        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(ServiceError::Unauthorized)?;

        if session.is_expired_at(Utc::now()) {
            if let Err(e) = self.store.delete_session(session_id).await {
                tracing::warn!("Failed to remove expired session: {}", e);
            }
            return Err(ServiceError::Unauthorized);
        }

        Ok(session.user_id)
    }

    /// Ends a session. Destroying an unknown session is not an error.
    ///
    /// # Errors
    /// `DestroyFailed` if the store cannot remove the record.
    pub async fn destroy(&self, session_id: &str) -> ServiceResult<()> {
        match self.store.delete_session(session_id).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!("Session destroy failed: {}", e);
                Err(ServiceError::destroy_failed(e.to_string()))
            }
        }
    }

    /// Deletes every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> ServiceResult<u64> {
        self.store.delete_expired(Utc::now()).await
    }
}
