//! Core business logic for the authentication endpoints.
//!
//! `AuthService` owns handles to the injected stores and exposes the five
//! boundary operations. Input is validated here, before any store access.

use crate::auth::github::OAuthProvider;
use crate::auth::models::*;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::{SessionStore, UserStore};
use crate::services::identity_service::IdentityService;
use crate::services::session_service::SessionService;
use crate::services::user_service::UserService;
use chrono::Duration;
use std::sync::Arc;
use validator::Validate;

/// Authentication service shared by all handlers.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    github: Option<Arc<dyn OAuthProvider>>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        github: Option<Arc<dyn OAuthProvider>>,
        session_ttl: Duration,
    ) -> Self {
        AuthService {
            users,
            sessions,
            github,
            session_ttl,
        }
    }

    fn user_service(&self) -> UserService<'_> {
        UserService::new(self.users.as_ref())
    }

    pub fn session_service(&self) -> SessionService<'_> {
        SessionService::new(self.sessions.as_ref(), self.session_ttl)
    }

    /// Register a local user. No session is started.
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<UserInfo> {
        validate_request(&request)?;

        let user = self
            .user_service()
            .create_local(&request.email, &request.password)
            .await?;

        Ok(user.into())
    }

    /// Authenticate with email and password and start a session.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginOutcome> {
        validate_request(&request)?;

        let user_service = self.user_service();
        let user = user_service
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        if !user_service.verify_password(&user, &request.password) {
            tracing::warn!("Rejected login for user {}", user.id);
            return Err(ServiceError::WrongPassword);
        }

        let session_id = self.session_service().create(&user.id).await?;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginOutcome {
            user: user.into(),
            session_id,
        })
    }

    /// Replace the password of `user_id`. Existing sessions stay valid.
    pub async fn change_password(
        &self,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> ServiceResult<UserInfo> {
        validate_request(&request)?;

        let user = self
            .user_service()
            .set_password(user_id, &request.password)
            .await?;
        tracing::info!("User {} changed password", user.id);

        Ok(user.into())
    }

    /// End the caller's session, if any.
    pub async fn logout(&self, session_id: Option<&str>) -> ServiceResult<()> {
        match session_id {
            Some(session_id) => self.session_service().destroy(session_id).await,
            None => Ok(()),
        }
    }

    /// Link a provider profile to a local user and start a session.
    pub async fn oauth_callback(&self, profile: GithubProfile) -> ServiceResult<LoginOutcome> {
        let user = IdentityService::new(self.users.as_ref())
            .resolve_or_create(&profile)
            .await?;

        let session_id = self
            .session_service()
            .create(&user.id)
            .await
            .map_err(|e| ServiceError::linking_failure(e.to_string()))?;
        tracing::info!("User {} logged in with GitHub", user.id);

        Ok(LoginOutcome {
            user: user.into(),
            session_id,
        })
    }

    /// Resolve the caller's session to a user id.
    pub async fn check_session(&self, session_id: Option<&str>) -> ServiceResult<SessionInfo> {
        let session_id = session_id.ok_or(ServiceError::Unauthorized)?;
        let user_id = self.session_service().validate(session_id).await?;
        Ok(SessionInfo { user_id })
    }

    /// The configured OAuth provider.
    ///
    /// # Errors
    /// `ExternalService` when GitHub login is not configured.
    pub fn github(&self) -> ServiceResult<&dyn OAuthProvider> {
        self.github
            .as_deref()
            .ok_or_else(|| ServiceError::external_service("GitHub login is not configured"))
    }
}

fn validate_request(request: &impl Validate) -> ServiceResult<()> {
    if let Err(validation_errors) = request.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        return Err(ServiceError::validation(error_messages.join(", ")));
    }
    Ok(())
}
