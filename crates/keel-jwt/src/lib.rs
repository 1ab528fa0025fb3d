//! Keel JWT Library
//!
//! Signed, time-bounded identity tokens for HTTP services.
//!
//! # Modules
//!
//! - `claims` - Claim map and typed identity/name extraction
//! - `clock` - Injectable time source
//! - `engine` - Token issuance and validation (`TokenEngine`, `HmacEngine`)
//! - `errors` - Per-stage error types
//! - `header` - `Authorization` header handling
//! - `token` - Decoded token and compact-form parsing
//!
//! # Example
//!
//! ```
//! use keel_jwt::{HmacEngine, TokenEngine};
//! use common::secret::secret_bytes;
//!
//! let engine = HmacEngine::with_default_lease(secret_bytes("secret")).unwrap();
//! let signed = engine.signed_string_for_identity(1).unwrap();
//!
//! assert_eq!(engine.extract_identity_from_signed_string(&signed), Ok(1));
//! ```

#![warn(clippy::pedantic)]

pub mod claims;
pub mod clock;
pub mod engine;
pub mod errors;
pub mod header;
pub mod token;

pub use claims::{extract_identity, extract_name, Claims};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{EngineConfig, HmacEngine, TokenEngine, DEFAULT_LEASE};
pub use errors::{
    ConfigError, ExtractError, HeaderError, ParseError, SignError, TokenError, ValidationError,
};
pub use token::Token;
