//! # Keel Test Utilities
//!
//! Shared test utilities for the Keel crates.
//!
//! This crate provides:
//! - Fixed secrets, clocks and engines for reproducible tokens
//! - Seeded and failing stores
//! - Server test harness (TestServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keel_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestServer::spawn().await?;
//!
//!     let token = server.login(TEST_USERNAME, TEST_PASSWORD).await?;
//!     token.assert_valid_jwt().assert_identity(1);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
