use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User account.
///
/// `password_hash` is a bcrypt hash and is never serialized into responses.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// Setting write request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

/// Query parameters accepted by the settings endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsQuery {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub keys: String,
}

impl SettingsQuery {
    /// Requested keys: `key` when present, otherwise the comma-separated
    /// `keys` list with blanks dropped.
    #[must_use]
    pub fn requested_keys(&self) -> Vec<String> {
        if !self.key.is_empty() {
            return vec![self.key.clone()];
        }

        self.keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}
