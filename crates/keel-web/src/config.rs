//! Keel web service configuration.
//!
//! Configuration is loaded from environment variables. The signing secret and
//! the seed password are held in `secrecy` wrappers and redacted in Debug output.

use common::secret::{secret_bytes, ExposeSecret, SecretBytes, SecretString};
use keel_jwt::DEFAULT_LEASE;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Version reported by the health endpoints when `APP_VERSION` is unset.
pub const DEFAULT_APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bcrypt cost factor (~200ms per hash).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost. Lower values are too cheap to brute-force.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost. Higher values make login unreasonably slow.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Credentials for a user inserted into the in-memory store at startup.
pub struct SeedUser {
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Keel web service configuration.
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// HMAC secret for token signing.
    pub jwt_secret: SecretBytes,

    /// Token validity period (default: 30 days).
    pub jwt_lease: Duration,

    /// Version string reported by the health endpoints.
    pub app_version: String,

    /// Extra paths that bypass the auth middleware.
    pub skip_auth_paths: Vec<String>,

    /// Setting keys clients may read or write. Empty allows every key.
    pub setting_keys_whitelist: Vec<String>,

    /// Bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,

    /// Optional user seeded at startup.
    pub seed_user: Option<SeedUser>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_lease", &self.jwt_lease)
            .field("app_version", &self.app_version)
            .field("skip_auth_paths", &self.skip_auth_paths)
            .field("setting_keys_whitelist", &self.setting_keys_whitelist)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("seed_user", &self.seed_user)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT lease configuration: {0}")]
    InvalidJwtLease(String),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid seed user configuration: {0}")]
    InvalidSeedUser(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let raw_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        if raw_secret.is_empty() {
            return Err(ConfigError::InvalidJwtSecret(
                "JWT_SECRET must not be empty".to_string(),
            ));
        }
        let jwt_secret = secret_bytes(raw_secret.as_bytes());

        let jwt_lease = match vars.get("JWT_LEASE_SECONDS") {
            Some(value_str) => {
                let secs: u64 = value_str.trim().parse().map_err(|e| {
                    ConfigError::InvalidJwtLease(format!(
                        "JWT_LEASE_SECONDS must be a valid integer, got '{value_str}': {e}"
                    ))
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidJwtLease(
                        "JWT_LEASE_SECONDS must be positive".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_LEASE,
        };

        let app_version = vars
            .get("APP_VERSION")
            .cloned()
            .unwrap_or_else(|| DEFAULT_APP_VERSION.to_string());

        let skip_auth_paths = split_list(vars.get("SKIP_AUTH_PATHS"));
        let setting_keys_whitelist = split_list(vars.get("SETTING_KEYS_WHITELIST"));

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(value_str) => {
                let cost: u32 = value_str.trim().parse().map_err(|e| {
                    ConfigError::InvalidBcryptCost(format!(
                        "BCRYPT_COST must be a valid integer, got '{value_str}': {e}"
                    ))
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidBcryptCost(format!(
                        "BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {cost}"
                    )));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let seed_user = match (vars.get("SEED_USERNAME"), vars.get("SEED_PASSWORD")) {
            (None, None) => None,
            (Some(username), Some(password)) if !username.is_empty() => Some(SeedUser {
                username: username.clone(),
                password: SecretString::from(password.as_str()),
            }),
            _ => {
                return Err(ConfigError::InvalidSeedUser(
                    "SEED_USERNAME and SEED_PASSWORD must be set together".to_string(),
                ))
            }
        };

        Ok(Config {
            bind_address,
            jwt_secret,
            jwt_lease,
            app_version,
            skip_auth_paths,
            setting_keys_whitelist,
            bcrypt_cost,
            seed_user,
        })
    }

    /// The signing secret, for handing to the token engine.
    #[must_use]
    pub fn jwt_secret_bytes(&self) -> SecretBytes {
        secret_bytes(self.jwt_secret.expose_secret().clone())
    }
}

/// Comma-separated list, trimmed, empties dropped.
fn split_list(value: Option<&String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
