//! One-way salted password hashing.
//!
//! bcrypt generates a fresh salt per call, so hashing is non-deterministic.
//! Verification never errors: anything that is not a matching bcrypt hash
//! simply fails.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! rejected instead of being silently truncated.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{BcryptError, non_truncating_hash, non_truncating_verify};

/// bcrypt work factor.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Longest password bcrypt hashes without truncation, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes a plaintext password with a random salt.
///
/// # Errors
/// Returns `ServiceError::Validation` for an empty password or one longer
/// than `MAX_PASSWORD_BYTES`.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    if password.is_empty() {
        return Err(ServiceError::validation("password: Password is required"));
    }

    non_truncating_hash(password, PASSWORD_HASH_COST).map_err(|e| match e {
        BcryptError::Truncation(_) => ServiceError::validation(format!(
            "password: Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )),
        e => anyhow::anyhow!("Password hashing failed: {}", e).into(),
    })
}

/// Checks a plaintext password against a stored hash.
///
/// Returns `false` for an empty or malformed hash, and for a password longer
/// than `MAX_PASSWORD_BYTES`.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if password_hash.is_empty() {
        return false;
    }
    non_truncating_verify(password, password_hash).unwrap_or(false)
}
