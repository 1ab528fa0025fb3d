//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] wrappers used throughout Keel. The token
//! signing secret and user passwords travel in these types so that a derived
//! `Debug` on any containing struct prints `[REDACTED]` instead of the value.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretBytes, SecretString};
//!
//! let signing_secret = SecretBytes::new(Box::new(b"secret".to_vec()));
//! assert_eq!(signing_secret.expose_secret().as_slice(), b"secret");
//!
//! let password = SecretString::from("hunter2");
//! assert!(!format!("{password:?}").contains("hunter2"));
//! ```
//!
//! Use `SecretBytes` for:
//! - The HMAC key that signs identity tokens
//!
//! Use `SecretString` for:
//! - Login passwords
//! - Bearer tokens held outside of a request

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

/// Owned binary secret, such as an HMAC signing key.
pub type SecretBytes = SecretBox<Vec<u8>>;

/// Wrap raw bytes as a [`SecretBytes`].
#[must_use]
pub fn secret_bytes(bytes: impl Into<Vec<u8>>) -> SecretBytes {
    SecretBox::new(Box::new(bytes.into()))
}
