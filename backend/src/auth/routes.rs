//! Defines the HTTP routes specifically for authentication.
//!
//! These routes are designed to be nested under `/api/auth` in the main
//! Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::session_auth;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/github", get(github_login))
        .route("/github/callback", get(github_callback))
        .route("/me", get(me))
        .route(
            "/password",
            post(change_password).layer(middleware::from_fn(session_auth)),
        )
}
