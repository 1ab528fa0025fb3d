//! Storage collaborators consumed by the HTTP layer.
//!
//! The token engine never touches a store; handlers resolve identities
//! through these traits so the backing storage can be swapped freely.

pub mod memory;

pub use memory::{InMemorySettingStore, InMemoryUserStore};

use crate::models::User;
use thiserror::Error;

/// Store lookup and persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user not found")]
    UserIdNotFound,

    #[error("username not found")]
    UsernameNotFound,

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// User lookup and persistence.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by numeric identity.
    async fn find(&self, id: u64) -> Result<User, StoreError>;

    /// Find a user by login name.
    async fn find_by_username(&self, username: &str) -> Result<User, StoreError>;

    /// Insert or replace a user, keyed by `id`.
    async fn save(&self, user: User) -> Result<(), StoreError>;
}

/// Per-user key/value settings.
#[async_trait::async_trait]
pub trait SettingStore: Send + Sync {
    /// Read a setting. A key that was never written reads as `""`.
    async fn get(&self, user_id: u64, key: &str) -> Result<String, StoreError>;

    async fn set(&self, user_id: u64, key: &str, value: &str) -> Result<(), StoreError>;
}
