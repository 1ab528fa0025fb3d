//! Password hashing.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid bcrypt cost: {0} (must be {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST})")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Password verification failed: {0}")]
    Verification(String),
}

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `CryptoError::InvalidCost` if `cost` is outside 10-14, even though
/// config validates it too, or `CryptoError::Hashing` if bcrypt fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, CryptoError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(CryptoError::InvalidCost(cost));
    }

    bcrypt::hash(password, cost).map_err(|e| CryptoError::Hashing(e.to_string()))
}

/// Check a password against a bcrypt hash.
///
/// # Errors
///
/// Returns `CryptoError::Verification` if `hash` is not a valid bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CryptoError> {
    bcrypt::verify(password, hash).map_err(|e| CryptoError::Verification(e.to_string()))
}
