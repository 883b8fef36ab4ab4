//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. API-facing shapes live in `auth::models`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

/// Role assigned to every new user. Informational only.
pub const DEFAULT_ROLE: &str = "user";

#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    /// Absent only for GitHub accounts whose profile exposed no email.
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub github_id: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Hand-written so the hash never reaches logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "<redacted>"),
            )
            .field("github_id", &self.github_id)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Insert payload for a user row. The password, if any, is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub github_id: Option<String>,
    pub role: String,
}

impl CreateUser {
    /// A local account identified by email and password.
    pub fn local(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            email: Some(email.into()),
            password_hash: Some(password_hash.into()),
            github_id: None,
            role: DEFAULT_ROLE.to_string(),
        }
    }

    /// A federated account linked to a GitHub identity, without a password.
    pub fn federated(github_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            email,
            password_hash: None,
            github_id: Some(github_id.into()),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

/// Server-side session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque identifier handed to the client.
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Row shape of the `sessions` table; timestamps are unix seconds.
#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub id: String,
    pub user_id: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            expires_at: DateTime::from_timestamp(row.expires_at, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_debug_redacts_password_hash() {
        let now = Utc::now();
        let user = User {
            id: "u1".to_string(),
            email: Some("a@x.com".to_string()),
            password_hash: Some("$2b$10$secretsecretsecret".to_string()),
            github_id: None,
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        };

        let printed = format!("{:?}", user);
        assert!(!printed.contains("secretsecret"));
        assert!(printed.contains("<redacted>"));

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_session_row_conversion() {
        let row = SessionRow {
            id: "sid".to_string(),
            user_id: "u1".to_string(),
            created_at: 1_700_000_000,
            expires_at: 1_700_086_400,
        };
        let session = Session::from(row);
        assert_eq!(session.expires_at - session.created_at, Duration::days(1));
        assert!(session.is_expired_at(session.expires_at));
        assert!(!session.is_expired_at(session.created_at));
    }
}
