//! Data structures for authentication requests and responses.
//!
//! Request fields default to empty strings so a missing field reaches
//! validation and is reported as missing credentials.

use crate::database::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request payload
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request payload
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change payload for the logged-in user
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Identity returned by the OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubProfile {
    /// Stable numeric GitHub id, as a string
    pub github_id: String,
    pub email: Option<String>,
}

/// Query parameters of the GitHub OAuth callback
#[derive(Debug, Deserialize)]
pub struct GithubCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: Option<String>,
    pub github_id: Option<String>,
    pub role: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            github_id: user.github_id,
            role: user.role,
        }
    }
}

/// A user together with the session just established for them
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: UserInfo,
    pub session_id: String,
}

/// Response of the session check endpoint
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub user_id: String,
}
