//! Middleware protecting routes behind a valid session.
//!
//! The session id travels in the `sid` cookie. `authorize` is the whole
//! decision: a live session allows the request with its user id, anything
//! else (no cookie, unknown or expired id, unreadable store) denies it.

use crate::api::common::{ApiError, service_error_to_http};
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::services::session_service::SessionService;
use axum::{Extension, extract::Request, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(String),
    Deny,
}

/// User id of the authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Decides whether a request carrying `session_id` may proceed.
pub async fn authorize(sessions: &SessionService<'_>, session_id: Option<&str>) -> AccessDecision {
    let Some(session_id) = session_id else {
        return AccessDecision::Deny;
    };

    match sessions.validate(session_id).await {
        Ok(user_id) => AccessDecision::Allow(user_id),
        Err(ServiceError::Unauthorized) => AccessDecision::Deny,
        Err(e) => {
            tracing::error!("Session lookup failed, denying access: {}", e);
            AccessDecision::Deny
        }
    }
}

/// Session authentication middleware
pub async fn session_auth(
    Extension(auth): Extension<AuthService>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_id = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());

    match authorize(&auth.session_service(), session_id).await {
        AccessDecision::Allow(user_id) => {
            request.extensions_mut().insert(CurrentUser(user_id));
            Ok(next.run(request).await)
        }
        AccessDecision::Deny => Err(service_error_to_http(ServiceError::Unauthorized)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::repositories::session_repository::SessionRepository;
    use chrono::Duration;

    #[tokio::test]
    async fn test_authorize_decisions() {
        let db = Database::in_memory().await.unwrap();
        let store = SessionRepository::new(db.pool().clone());
        let sessions = SessionService::new(&store, Duration::hours(1));

        let session_id = sessions.create("u1").await.unwrap();
        assert_eq!(
            authorize(&sessions, Some(&session_id)).await,
            AccessDecision::Allow("u1".to_string())
        );
        assert_eq!(authorize(&sessions, None).await, AccessDecision::Deny);
        assert_eq!(
            authorize(&sessions, Some("never-issued")).await,
            AccessDecision::Deny
        );

        sessions.destroy(&session_id).await.unwrap();
        assert_eq!(
            authorize(&sessions, Some(&session_id)).await,
            AccessDecision::Deny
        );
    }

    #[tokio::test]
    async fn test_store_failure_denies() {
        let db = Database::in_memory().await.unwrap();
        let store = SessionRepository::new(db.pool().clone());
        let sessions = SessionService::new(&store, Duration::hours(1));
        let session_id = sessions.create("u1").await.unwrap();

        db.close().await;
        assert_eq!(
            authorize(&sessions, Some(&session_id)).await,
            AccessDecision::Deny
        );
    }
}
