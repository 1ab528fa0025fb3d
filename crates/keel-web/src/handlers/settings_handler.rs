//! Per-user settings handlers.
//!
//! When a whitelist is configured, every requested key must be on it.

use crate::context::{AuthUser, JsonBody, QueryParams};
use crate::errors::ApiError;
use crate::models::{SettingValue, SettingsQuery};
use crate::stores::SettingStore;
use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// State shared by the settings handlers.
#[derive(Clone)]
pub struct SettingsState {
    pub store: Arc<dyn SettingStore>,
    /// Allowed keys. Empty allows every key.
    pub keys_whitelist: Arc<Vec<String>>,
}

impl SettingsState {
    pub fn new(store: Arc<dyn SettingStore>, keys_whitelist: Vec<String>) -> Self {
        Self {
            store,
            keys_whitelist: Arc::new(keys_whitelist),
        }
    }

    fn check_key(&self, key: &str) -> Result<(), ApiError> {
        if self.keys_whitelist.is_empty() || self.keys_whitelist.iter().any(|k| k == key) {
            Ok(())
        } else {
            tracing::debug!(target: "keel.web.handlers.settings", key = %key, "Setting key not allowed");
            Err(ApiError::invalid_field("key", "key not allowed"))
        }
    }
}

/// Read settings
///
/// GET /api/v1/settings?key=theme
/// GET /api/v1/settings?keys=theme,lang
///
/// ## Response
///
/// ```json
/// { "theme": "dark", "lang": "" }
/// ```
#[instrument(skip_all, name = "keel.web.handlers.settings.get")]
pub async fn get_settings(
    State(state): State<SettingsState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<SettingsQuery>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let keys = query.requested_keys();
    for key in &keys {
        state.check_key(key)?;
    }

    let mut settings = BTreeMap::new();
    for key in keys {
        let value = state
            .store
            .get(user_id, &key)
            .await
            .map_err(|e| ApiError::Internal(format!("get setting error: {e}")))?;
        settings.insert(key, value);
    }

    Ok(Json(settings))
}

/// Write a setting
///
/// PUT /api/v1/settings?key=theme with body `{"value": "dark"}`
#[instrument(skip_all, name = "keel.web.handlers.settings.set")]
pub async fn set_settings(
    State(state): State<SettingsState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<SettingsQuery>,
    JsonBody(body): JsonBody<SettingValue>,
) -> Result<Json<&'static str>, ApiError> {
    state.check_key(&query.key)?;

    state
        .store
        .set(user_id, &query.key, &body.value)
        .await
        .map_err(|e| ApiError::Internal(format!("set setting error: {e}")))?;

    Ok(Json("OK"))
}
