//! Claim map and typed claim extraction.
//!
//! Claim values are kept as [`serde_json::Value`] because their concrete
//! representation depends on who encoded the token. A token issued by this
//! engine carries `id` as a JSON integer, but other encoders may emit `1.0`,
//! and after decoding that arrives as a float. The extractors here coerce
//! those representations into strict types and reject everything else.

use crate::errors::ExtractError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Claim key carrying the numeric identity.
pub const ID_KEY: &str = "id";

/// Claim key carrying the display name.
pub const NAME_KEY: &str = "name";

/// Claim key for the issued-at NumericDate.
pub const ISSUED_AT_KEY: &str = "iat";

/// Claim key for the expiry NumericDate.
pub const EXPIRES_AT_KEY: &str = "exp";

// 2^64 as f64. Floats at or above this do not fit in a u64.
const U64_UPPER_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Decoded claim set of a token.
///
/// Backed by a `BTreeMap` so that keys serialize in sorted order, which keeps
/// the wire form of an issued token deterministic.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, Value>);

impl Claims {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `iat` claim as seconds since the Unix epoch, if numeric.
    #[must_use]
    pub fn issued_at(&self) -> Option<i64> {
        self.get(ISSUED_AT_KEY).and_then(numeric_date)
    }

    /// The `exp` claim as seconds since the Unix epoch, if numeric.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.get(EXPIRES_AT_KEY).and_then(numeric_date)
    }
}

impl FromIterator<(String, Value)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Only claim names are printed; identities and names stay out of logs.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .field("iat", &self.issued_at())
            .field("exp", &self.expires_at())
            .finish()
    }
}

/// Extract the numeric identity from the `id` claim.
///
/// Accepts an unsigned JSON integer, or a float that is finite, non-negative,
/// integral and within `u64` range.
///
/// # Errors
///
/// Returns `ExtractError::InvalidIdentity` when the claim is absent, negative,
/// fractional, out of range, or not a number.
pub fn extract_identity(claims: &Claims) -> Result<u64, ExtractError> {
    claims
        .get(ID_KEY)
        .and_then(coerce_identity)
        .ok_or(ExtractError::InvalidIdentity)
}

/// Extract the display name from the `name` claim.
///
/// # Errors
///
/// Returns `ExtractError::InvalidName` when the claim is absent or not a string.
pub fn extract_name(claims: &Claims) -> Result<String, ExtractError> {
    match claims.get(NAME_KEY) {
        Some(Value::String(name)) => Ok(name.clone()),
        _ => Err(ExtractError::InvalidName),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_identity(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(id) = number.as_u64() {
        return Some(id);
    }

    // Negative integers land here; they are not floats.
    if number.is_i64() {
        return None;
    }

    let float = number.as_f64()?;
    let integral = float.is_finite() && float.fract() == 0.0;
    if integral && float >= 0.0 && float < U64_UPPER_BOUND {
        Some(float as u64)
    } else {
        None
    }
}

// RFC 7519 NumericDate: integer or fractional seconds. Fractions are floored.
#[allow(clippy::cast_possible_truncation)]
fn numeric_date(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(secs) = number.as_i64() {
        return Some(secs);
    }

    number
        .as_f64()
        .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f.floor() as i64)
}
