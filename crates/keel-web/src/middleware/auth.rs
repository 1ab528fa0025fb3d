//! Authentication middleware.
//!
//! Validates the `Authorization` header of every request whose path is not
//! on the skip list, and stores the validated claims in request extensions
//! as [`AuthClaims`] for downstream extractors.

use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use keel_jwt::{Claims, TokenEngine};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// Claims of a validated token, attached to the request.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub engine: Arc<dyn TokenEngine>,
    /// Exact request paths that bypass validation.
    pub skip_paths: Arc<HashSet<String>>,
}

impl AuthMiddlewareState {
    pub fn new(engine: Arc<dyn TokenEngine>, skip_paths: impl IntoIterator<Item = String>) -> Self {
        Self {
            engine,
            skip_paths: Arc::new(skip_paths.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn is_skipped(&self, path: &str) -> bool {
        self.skip_paths.contains(path)
    }
}

/// Authentication middleware.
///
/// # Response
///
/// - Returns 401 Unauthorized with a generic message if the header is
///   missing, malformed, or carries an invalid or expired token
/// - Continues to next handler with `AuthClaims` in extensions otherwise
#[instrument(skip_all, name = "keel.web.middleware.auth")]
pub async fn require_auth(
    State(state): State<AuthMiddlewareState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if state.is_skipped(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    let (_, claims) = state.engine.validate_header(auth_header).map_err(|e| {
        tracing::debug!(
            target: "keel.web.middleware.auth",
            error = %e,
            expired = e.is_expired(),
            "Request rejected: token validation failed"
        );
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthClaims(claims));

    Ok(next.run(req).await)
}
