//! Error taxonomy for token issuance and validation.
//!
//! Each stage has its own error type. Composed operations wrap the failing
//! stage in [`TokenError`] so callers can tell a malformed token from a
//! well-formed but invalid one, and both from a bad transport header.
//!
//! Messages name the failure class only. They never echo token contents.

use thiserror::Error;

/// Engine construction failed because the configuration is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The signing secret is empty.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// The requested algorithm is not an HMAC algorithm.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The lease does not fit into a timestamp offset.
    #[error("lease of {0} seconds is out of range")]
    LeaseOutOfRange(u64),
}

/// Signing a claim set failed.
///
/// Signing with an in-memory HMAC key only fails on a configuration fault,
/// so callers should treat this as fatal for the operation rather than retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// The wire form could not be decoded into a token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Token exceeds `MAX_TOKEN_SIZE_BYTES`.
    #[error("token too large")]
    TooLarge,

    /// Not three base64url segments, or a segment is not the expected JSON.
    #[error("malformed token: {0}")]
    Malformed(&'static str),

    /// The header declares a signing method outside the HMAC family.
    #[error("unexpected signing method: {0}")]
    UnexpectedSigningMethod(String),
}

/// A decoded token failed cryptographic or temporal validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid token signature")]
    InvalidSignature,

    /// A required claim is missing or has the wrong shape.
    #[error("invalid claims: {0}")]
    InvalidClaims(&'static str),

    #[error("token expired")]
    Expired {
        /// Expiry claim, seconds since the Unix epoch.
        exp: i64,
        /// Clock reading at validation time.
        now: i64,
    },
}

/// The transport header could not carry a token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    #[error("auth header missing")]
    Missing,

    #[error("malformed auth header")]
    Malformed,
}

/// A claim was present but not of the expected type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid identity")]
    InvalidIdentity,

    #[error("invalid name")]
    InvalidName,
}

/// Failure of a composed operation, tagged with the stage that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("parse error: {0}")]
    Parse(#[source] ParseError),

    #[error("validate error: {0}")]
    Validate(#[source] ValidationError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl TokenError {
    /// True when the token was well-formed and correctly signed but expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Validate(ValidationError::Expired { .. }))
    }
}

impl From<ParseError> for TokenError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<ValidationError> for TokenError {
    fn from(e: ValidationError) -> Self {
        Self::Validate(e)
    }
}
