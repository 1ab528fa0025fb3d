//! Decoded token and compact-form parsing.
//!
//! Parsing checks structure and the declared algorithm only. Signature and
//! expiry are checked by the engine's `validate`.

use crate::claims::Claims;
use crate::errors::ParseError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Maximum accepted size of a compact token (8KB).
///
/// Checked before any decoding. Issued tokens are around 150 bytes.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Signing algorithms accepted on the inbound side.
pub const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// A signed identity token.
///
/// Always holds its compact wire form; the claims and algorithm are the
/// decoded view of that same string. `Debug` never prints the wire form.
#[derive(Clone, PartialEq)]
pub struct Token {
    compact: String,
    algorithm: Algorithm,
    claims: Claims,
    signing_input_len: usize,
}

impl Token {
    pub(crate) fn from_parts(compact: String, algorithm: Algorithm, claims: Claims) -> Self {
        let signing_input_len = compact.rfind('.').unwrap_or(compact.len());
        Self {
            compact,
            algorithm,
            claims,
            signing_input_len,
        }
    }

    /// The compact `header.payload.signature` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// `header.payload`, the bytes covered by the signature.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        self.compact.get(..self.signing_input_len).unwrap_or_default()
    }

    /// The base64url signature segment.
    #[must_use]
    pub fn signature(&self) -> &str {
        self.compact
            .get(self.signing_input_len + 1..)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.compact
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("compact", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("claims", &self.claims)
            .finish()
    }
}

/// Decode a compact token without verifying its signature or expiry.
///
/// # Errors
///
/// - `TooLarge` if the input exceeds [`MAX_TOKEN_SIZE_BYTES`]
/// - `Malformed` if it is not three base64url segments with a JSON header and
///   a JSON object payload
/// - `UnexpectedSigningMethod` if the header's `alg` is not HS256, HS384 or HS512
pub fn parse(compact: &str) -> Result<Token, ParseError> {
    if compact.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "keel.jwt",
            token_size = compact.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(ParseError::TooLarge);
    }

    let mut segments = compact.split('.');
    let (Some(header_part), Some(payload_part), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!(target: "keel.jwt", "Token rejected: expected 3 segments");
        return Err(ParseError::Malformed("expected 3 segments"));
    };

    let header: RawHeader = decode_segment(header_part).ok_or_else(|| {
        tracing::debug!(target: "keel.jwt", "Token rejected: undecodable header");
        ParseError::Malformed("invalid header")
    })?;

    let algorithm = hmac_algorithm(&header.alg).ok_or_else(|| {
        tracing::debug!(
            target: "keel.jwt",
            alg = %header.alg,
            "Token rejected: signing method is not HMAC"
        );
        ParseError::UnexpectedSigningMethod(header.alg.clone())
    })?;

    let claims: Claims = decode_segment(payload_part).ok_or_else(|| {
        tracing::debug!(target: "keel.jwt", "Token rejected: payload is not a JSON object");
        ParseError::Malformed("invalid payload")
    })?;

    Ok(Token::from_parts(compact.to_string(), algorithm, claims))
}

fn hmac_algorithm(alg: &str) -> Option<Algorithm> {
    Algorithm::from_str(alg)
        .ok()
        .filter(|algorithm| HMAC_ALGORITHMS.contains(algorithm))
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
