//! `Authorization` header handling.
//!
//! The accepted form is a 7-byte scheme prefix (`"Bearer "`) followed
//! immediately by the compact token. The prefix is stripped by position and
//! its content is not inspected, so any 7-byte prefix is accepted.

use crate::errors::HeaderError;

/// Length of the `"Bearer "` scheme prefix.
pub const BEARER_PREFIX_LEN: usize = 7;

/// The scheme prefix used when emitting headers.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Strip the scheme prefix and return the token part.
///
/// # Errors
///
/// - `HeaderError::Missing` for an empty header
/// - `HeaderError::Malformed` for a header shorter than the prefix, or one
///   whose 7th byte is not a character boundary
pub fn strip_scheme(auth_header: &str) -> Result<&str, HeaderError> {
    if auth_header.is_empty() {
        return Err(HeaderError::Missing);
    }
    if auth_header.len() < BEARER_PREFIX_LEN {
        return Err(HeaderError::Malformed);
    }
    auth_header
        .get(BEARER_PREFIX_LEN..)
        .ok_or(HeaderError::Malformed)
}

/// Format a token as an `Authorization` header value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}
