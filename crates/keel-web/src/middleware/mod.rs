//! Middleware for the Keel web layer.
//!
//! # Components
//!
//! - `auth` - Token validation for every route outside the skip list

pub mod auth;

pub use auth::{require_auth, AuthClaims, AuthMiddlewareState};
