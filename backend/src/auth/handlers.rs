//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data, call `AuthService`, and translate the
//! outcome into a status code, the JSON envelope and the session cookie.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::middleware::{CurrentUser, SESSION_COOKIE};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use axum::{
    extract::{Extension, Json, Query, rejection::JsonRejection},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

/// Transport settings for the session cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    pub secure: bool,
}

fn session_cookie(session_id: String, settings: CookieSettings) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .build()
}

fn session_id(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value())
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            tracing::debug!("Rejected request body: {}", rejection);
            service_error_to_http(ServiceError::validation("Credentials missing"))
        })
}

/// Handle user signup request
#[axum::debug_handler]
pub async fn signup(
    Extension(auth): Extension<AuthService>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let request = json_body(payload)?;
    let user = auth.signup(request).await.map_err(service_error_to_http)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user, "User created successfully")),
    ))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth): Extension<AuthService>,
    Extension(settings): Extension<CookieSettings>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<UserInfo>>), ApiError> {
    let request = json_body(payload)?;
    let outcome = auth.login(request).await.map_err(service_error_to_http)?;

    Ok((
        jar.add(session_cookie(outcome.session_id, settings)),
        Json(ApiResponse::success(outcome.user, "Logged in")),
    ))
}

/// Handle logout request
#[axum::debug_handler]
pub async fn logout(
    Extension(auth): Extension<AuthService>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    auth.logout(session_id(&jar))
        .await
        .map_err(service_error_to_http)?;

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    Ok((jar, Json(ApiResponse::message("Logged out"))))
}

/// Redirect the browser to GitHub to start the OAuth flow
#[axum::debug_handler]
pub async fn github_login(Extension(auth): Extension<AuthService>) -> Result<Redirect, ApiError> {
    let url = auth
        .github()
        .and_then(|github| github.authorize_url())
        .map_err(service_error_to_http)?;

    Ok(Redirect::to(&url))
}

/// Handle the OAuth callback from GitHub
#[axum::debug_handler]
pub async fn github_callback(
    Extension(auth): Extension<AuthService>,
    Extension(settings): Extension<CookieSettings>,
    jar: CookieJar,
    Query(query): Query<GithubCallbackQuery>,
) -> Result<(CookieJar, Json<ApiResponse<UserInfo>>), ApiError> {
    if let Some(error) = query.error {
        return Err(service_error_to_http(ServiceError::linking_failure(
            format!("GitHub returned error: {}", error),
        )));
    }
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| service_error_to_http(ServiceError::validation("code: Code is required")))?;

    let github = auth.github().map_err(service_error_to_http)?;
    let profile = github
        .fetch_profile(&code)
        .await
        .map_err(service_error_to_http)?;
    let outcome = auth
        .oauth_callback(profile)
        .await
        .map_err(service_error_to_http)?;

    Ok((
        jar.add(session_cookie(outcome.session_id, settings)),
        Json(ApiResponse::success(outcome.user, "Successfully logged in")),
    ))
}

/// Report the user bound to the caller's session
#[axum::debug_handler]
pub async fn me(
    Extension(auth): Extension<AuthService>,
    jar: CookieJar,
) -> Result<Json<ApiResponse<SessionInfo>>, ApiError> {
    let info = auth
        .check_session(session_id(&jar))
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(info, "Session is active")))
}

/// Change the password of the logged-in user
#[axum::debug_handler]
pub async fn change_password(
    Extension(auth): Extension<AuthService>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let request = json_body(payload)?;
    let user = auth
        .change_password(&user_id, request)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(user, "Password changed")))
}
