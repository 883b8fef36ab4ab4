//! Module for core business logic services.
//!
//! These services implement the authentication core on top of the store
//! traits in `repositories`: local credentials, federated identity linking
//! and server-side sessions.

pub mod identity_service;
pub mod session_service;
pub mod user_service;
