//! Health check handler.

use axum::{extract::State, Json};
use std::sync::Arc;

/// State for the health endpoints.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub version: Arc<str>,
}

impl HealthState {
    pub fn new(version: impl AsRef<str>) -> Self {
        Self {
            version: Arc::from(version.as_ref()),
        }
    }
}

/// Handler for `/healthz` and `/api/v1/healthz` (any method).
///
/// ## Response
///
/// ```json
/// "current running version: 1.0.0"
/// ```
pub async fn health_check(State(state): State<HealthState>) -> Json<String> {
    Json(version_message(&state.version))
}

fn version_message(version: &str) -> String {
    format!("current running version: {version}")
}
