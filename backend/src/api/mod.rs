//! Application API endpoints outside of authentication.
//!
//! Holds the shared response envelope, the health check and the sample
//! resource guarded by the session middleware.

pub mod common;
pub mod protected;

use crate::auth::handlers::CookieSettings;
use crate::auth::service::AuthService;
use axum::{Extension, Router};

/// Assembles the full application router.
pub fn app_router(auth: AuthService, cookies: CookieSettings) -> Router {
    Router::new()
        .merge(protected::health_router())
        .nest("/api/auth", crate::auth::routes::auth_router())
        .nest("/api/protected", protected::protected_router())
        .layer(Extension(auth))
        .layer(Extension(cookies))
}
