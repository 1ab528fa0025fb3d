//! Logging configuration shared by Keel binaries.
//!
//! Filter resolution order:
//! 1. `RUST_LOG`, when set and valid
//! 2. `LOG_LEVEL` (`trace`, `debug`, `info`, `warn`, `error`)
//! 3. The caller-supplied default directive

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Invalid log filter directive: {0}")]
    InvalidFilter(String),

    #[error("Tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is absent
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Build from environment-style variables.
    ///
    /// An unrecognized `LOG_LEVEL` falls back to `default_directive`.
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>, default_directive: &str) -> Self {
        let log_level = vars
            .get("LOG_LEVEL")
            .map(|level| level.trim().to_ascii_lowercase())
            .filter(|level| LOG_LEVELS.contains(&level.as_str()))
            .unwrap_or_else(|| default_directive.to_string());

        let json_logs = vars
            .get("LOG_JSON")
            .is_some_and(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"));

        Self {
            log_level,
            json_logs,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Returns `ObservabilityError::InvalidFilter` if the configured directive does
/// not parse, or `AlreadyInitialized` if a global subscriber is already set.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| ObservabilityError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    result.map_err(|e| ObservabilityError::AlreadyInitialized(e.to_string()))
}
