//! Main entry point for the authentication backend.
//!
//! This file initializes tracing, opens the database, wires the stores into
//! `AuthService`, starts the expired-session sweeper and serves the Axum
//! router.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::auth::github::{GithubClient, OAuthProvider};
use crate::auth::handlers::CookieSettings;
use crate::auth::service::AuthService;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::UserRepository;
use anyhow::Context;
use config::Config;
use database::Database;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config)
        .await
        .context("failed to open database")?;
    info!("Database ready");

    let github: Option<Arc<dyn OAuthProvider>> = match config.github.clone() {
        Some(github_config) => Some(Arc::new(GithubClient::new(github_config)?)),
        None => {
            info!("GITHUB_CLIENT_ID/GITHUB_CLIENT_SECRET not set, GitHub login disabled");
            None
        }
    };

    let auth = AuthService::new(
        Arc::new(UserRepository::new(db.pool().clone())),
        Arc::new(SessionRepository::new(db.pool().clone())),
        github,
        config.session_ttl,
    );

    spawn_session_sweeper(
        auth.clone(),
        Duration::from_secs(config.session_sweep_interval_seconds),
    );

    let app = api::app_router(
        auth,
        CookieSettings {
            secure: config.cookie_secure,
        },
    );

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server running on port {}", config.server_port);
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}

/// Periodically deletes expired sessions.
fn spawn_session_sweeper(auth: AuthService, every: Duration) {
    if every.is_zero() {
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match auth.session_service().purge_expired().await {
                Ok(0) => {}
                Ok(removed) => info!("Purged {} expired sessions", removed),
                Err(e) => tracing::error!("Session purge failed: {}", e),
            }
        }
    });
}
