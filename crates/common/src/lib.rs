//! Common utilities shared across Keel crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for logging configuration and subscriber setup
pub mod observability;
