//! Health check and session-protected routes.

use crate::api::common::ApiResponse;
use crate::auth::middleware::{CurrentUser, session_auth};
use axum::{Extension, Json, Router, middleware, routing::any, routing::get};
use serde_json::{Value, json};

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// Sample resource only reachable with a live session.
pub async fn protected_resource(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Json<ApiResponse<Value>> {
    tracing::debug!("Protected resource accessed by {}", user_id);
    Json(ApiResponse::success(
        json!({ "user_id": user_id }),
        "Accessing protected",
    ))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/", any(protected_resource))
        .layer(middleware::from_fn(session_auth))
}

pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}
