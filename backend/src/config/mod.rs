//! Central module for application-wide configuration settings.
//!
//! This module handles loading configuration parameters such as the database
//! URL, server port, session lifetime and the GitHub OAuth application.

use anyhow::{Context, Result};
use chrono::Duration;
use std::env;

const DEFAULT_GITHUB_CALLBACK_URL: &str = "http://localhost:3000/api/auth/github/callback";

/// Upper bound for `SESSION_TTL_SECONDS` (one year).
pub const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    pub session_ttl: Duration,
    pub session_sweep_interval_seconds: u64,
    pub cookie_secure: bool,
    /// `None` disables GitHub login.
    pub github: Option<GithubConfig>,
}

/// Credentials of the GitHub OAuth application.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let session_ttl = parse_session_ttl(
            &env::var("SESSION_TTL_SECONDS").unwrap_or_else(|_| "86400".to_string()),
        )?;

        let session_sweep_interval_seconds = env::var("SESSION_SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "600".to_string())
            .parse::<u64>()
            .context("SESSION_SWEEP_INTERVAL_SECONDS must be a valid number")?;

        let cookie_secure = env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("COOKIE_SECURE must be true or false")?;

        let github = match (env::var("GITHUB_CLIENT_ID"), env::var("GITHUB_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) => Some(GithubConfig {
                client_id,
                client_secret,
                callback_url: env::var("GITHUB_CALLBACK_URL")
                    .unwrap_or_else(|_| DEFAULT_GITHUB_CALLBACK_URL.to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            session_ttl,
            session_sweep_interval_seconds,
            cookie_secure,
            github,
        })
    }
}

/// Parses a session lifetime in seconds, bounded to `1..=MAX_SESSION_TTL_SECONDS`.
fn parse_session_ttl(raw: &str) -> Result<Duration> {
    let seconds = raw
        .parse::<i64>()
        .context("SESSION_TTL_SECONDS must be a valid number")?;
    if !(1..=MAX_SESSION_TTL_SECONDS).contains(&seconds) {
        anyhow::bail!(
            "SESSION_TTL_SECONDS must be between 1 and {}",
            MAX_SESSION_TTL_SECONDS
        );
    }

    Duration::try_seconds(seconds).context("SESSION_TTL_SECONDS is out of range")
}
