//! Authentication module: local credentials, GitHub login and sessions.
//!
//! This module provides the public interface for signup, login, logout,
//! GitHub OAuth, session checks and the session-guard middleware.

pub mod github;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
