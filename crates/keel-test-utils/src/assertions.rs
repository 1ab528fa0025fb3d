//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over compact token strings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::{Map, Value};

/// JOSE header of an issued token
#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("token has no segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("failed to base64 decode token segment {index}: {e}"))
}

fn claims_of(token: &str) -> Map<String, Value> {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse token claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_identity(1)
///     .assert_lease(30 * 24 * 3600);
/// ```
pub trait TokenAssertions {
    /// Assert a three-segment HS256 JWT with numeric `iat` and `exp`
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the `id` claim equals `id`
    fn assert_identity(&self, id: u64) -> &Self;

    /// Assert the `name` claim equals `name`
    fn assert_name(&self, name: &str) -> &Self;

    /// Assert `exp - iat` equals `seconds`
    fn assert_lease(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {parts}"
        );

        let header: TokenHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = claims_of(self);
        for key in ["iat", "exp"] {
            assert!(
                claims.get(key).is_some_and(Value::is_i64),
                "Expected integer '{key}' claim, got {:?}",
                claims.get(key)
            );
        }

        self
    }

    fn assert_identity(&self, id: u64) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.get("id").and_then(Value::as_u64),
            Some(id),
            "Expected identity {id}, got {:?}",
            claims.get("id")
        );
        self
    }

    fn assert_name(&self, name: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.get("name").and_then(Value::as_str),
            Some(name),
            "Expected name '{name}', got {:?}",
            claims.get("name")
        );
        self
    }

    fn assert_lease(&self, seconds: i64) -> &Self {
        let claims = claims_of(self);
        let iat = claims.get("iat").and_then(Value::as_i64).expect("iat claim");
        let exp = claims.get("exp").and_then(Value::as_i64).expect("exp claim");
        assert_eq!(exp - iat, seconds, "Expected lease of {seconds}s");
        self
    }
}
