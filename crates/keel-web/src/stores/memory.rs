//! In-memory store implementations.
//!
//! Backed by `tokio::sync::RwLock`. Data lives for the lifetime of the process.

use super::{SettingStore, StoreError, UserStore};
use crate::models::User;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Debug, Default)]
struct UserTable {
    by_id: HashMap<u64, User>,
    id_by_username: HashMap<String, u64>,
}

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<UserTable>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Smallest id not yet in use, starting at 1.
    pub async fn next_id(&self) -> u64 {
        self.users
            .read()
            .await
            .by_id
            .keys()
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    #[instrument(skip_all)]
    async fn find(&self, id: u64) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserIdNotFound)
    }

    #[instrument(skip_all)]
    async fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        let table = self.users.read().await;
        table
            .id_by_username
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned()
            .ok_or(StoreError::UsernameNotFound)
    }

    #[instrument(skip_all)]
    async fn save(&self, user: User) -> Result<(), StoreError> {
        let mut table = self.users.write().await;

        if let Some(&owner) = table.id_by_username.get(&user.username) {
            if owner != user.id {
                return Err(StoreError::UsernameTaken(user.username));
            }
        }

        if let Some(previous) = table.by_id.get(&user.id) {
            let previous_name = previous.username.clone();
            table.id_by_username.remove(&previous_name);
        }

        table.id_by_username.insert(user.username.clone(), user.id);
        table.by_id.insert(user.id, user);

        Ok(())
    }
}

/// In-memory [`SettingStore`].
#[derive(Debug, Default)]
pub struct InMemorySettingStore {
    settings: RwLock<HashMap<(u64, String), String>>,
}

impl InMemorySettingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SettingStore for InMemorySettingStore {
    #[instrument(skip_all)]
    async fn get(&self, user_id: u64, key: &str) -> Result<String, StoreError> {
        Ok(self
            .settings
            .read()
            .await
            .get(&(user_id, key.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    #[instrument(skip_all)]
    async fn set(&self, user_id: u64, key: &str, value: &str) -> Result<(), StoreError> {
        self.settings
            .write()
            .await
            .insert((user_id, key.to_string()), value.to_string());
        Ok(())
    }
}
