//! Global application error types.
//!
//! Every failure produced by the authentication core is expressed as a
//! `ServiceError`. Each variant is one kind of the error taxonomy and carries
//! a human-readable message; the HTTP layer maps the kind to a status code in
//! `api::common::service_error_to_http`.

use thiserror::Error;

/// Service-level error shared by stores, services and handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client input is missing or empty.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A user with this email already exists.
    #[error("User already exists: {email}")]
    DuplicateEmail { email: String },

    /// A user is already linked to this GitHub identity.
    #[error("GitHub identity already linked: {github_id}")]
    DuplicateGithubId { github_id: String },

    /// Password verification failed.
    #[error("Wrong password")]
    WrongPassword,

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    /// No session, or the session is unknown or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resolving a GitHub profile to a local user failed.
    #[error("Identity linking failed: {message}")]
    LinkingFailure { message: String },

    /// The session record could not be removed.
    #[error("Logout failed: {message}")]
    DestroyFailed { message: String },

    /// Unclassified persistence failure.
    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("External service error: {message}")]
    ExternalService { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn duplicate_github_id(github_id: impl Into<String>) -> Self {
        Self::DuplicateGithubId {
            github_id: github_id.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn linking_failure(message: impl Into<String>) -> Self {
        Self::LinkingFailure {
            message: message.into(),
        }
    }

    pub fn destroy_failed(message: impl Into<String>) -> Self {
        Self::DestroyFailed {
            message: message.into(),
        }
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    /// Machine-readable kind of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "missing_fields",
            Self::DuplicateEmail { .. } => "duplicate_email",
            Self::DuplicateGithubId { .. } => "duplicate_github_id",
            Self::WrongPassword => "wrong_password",
            Self::NotFound { .. } => "no_such_user",
            Self::Unauthorized => "unauthorized",
            Self::LinkingFailure { .. } => "linking_failure",
            Self::DestroyFailed { .. } => "destroy_failed",
            Self::Database { .. } => "store_unavailable",
            Self::ExternalService { .. } => "external_service_error",
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    /// Classifies unique-constraint violations on the users table; every other
    /// store error is reported as `Database`.
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                let message = db_error.message();
                if message.contains("users.email") {
                    return Self::duplicate_email("email");
                }
                if message.contains("users.github_id") {
                    return Self::duplicate_github_id("github_id");
                }
            }
        }
        Self::Database {
            source: error.into(),
        }
    }
}
