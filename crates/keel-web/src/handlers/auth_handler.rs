//! Login, token refresh and current-user handlers.
//!
//! Issued tokens are returned in the `Authorization` response header with a
//! JSON `"OK"` body.

use crate::context::{AuthUser, JsonBody};
use crate::crypto::{verify_password, CryptoError};
use crate::errors::ApiError;
use crate::models::{LoginRequest, User};
use crate::stores::{StoreError, UserStore};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use common::secret::{ExposeSecret, SecretString};
use keel_jwt::TokenEngine;
use std::sync::Arc;
use tracing::instrument;

/// State shared by the auth handlers.
#[derive(Clone)]
pub struct AuthHandlerState {
    pub engine: Arc<dyn TokenEngine>,
    pub users: Arc<dyn UserStore>,
}

/// Handle login
///
/// POST /api/v1/auth/login
///
/// ## Errors
///
/// - 422 `{"username": "username not exist"}` for an unknown user
/// - 422 `{"password": "password not match"}` for a wrong password
/// - 500 if the user store fails
#[instrument(skip_all, name = "keel.web.handlers.login")]
pub async fn handle_login(
    State(state): State<AuthHandlerState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = match state.users.find_by_username(&payload.username).await {
        Ok(user) => user,
        Err(StoreError::UsernameNotFound) => {
            tracing::debug!(target: "keel.web.handlers.auth", "Login rejected: unknown username");
            return Err(ApiError::invalid_field("username", "username not exist"));
        }
        Err(e) => return Err(ApiError::Internal(format!("find user by username error: {e}"))),
    };

    if !password_matches(payload.password, user.password_hash.clone()).await? {
        tracing::debug!(
            target: "keel.web.handlers.auth",
            user_id = user.id,
            "Login rejected: password mismatch"
        );
        return Err(ApiError::invalid_field("password", "password not match"));
    }

    let token = state
        .engine
        .signed_string_for_identity(user.id)
        .map_err(|e| ApiError::Internal(format!("sign error: {e}")))?;

    tracing::info!(target: "keel.web.handlers.auth", user_id = user.id, "User logged in");

    token_response(&token)
}

/// Handle token refresh
///
/// GET /api/v1/auth/refresh
///
/// Issues a fresh token for the identity carried by the current one.
#[instrument(skip_all, name = "keel.web.handlers.refresh")]
pub async fn handle_refresh(
    State(state): State<AuthHandlerState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let token = state
        .engine
        .signed_string_for_identity(user_id)
        .map_err(|e| ApiError::Internal(format!("sign error: {e}")))?;

    tracing::debug!(target: "keel.web.handlers.auth", user_id = user_id, "Token refreshed");

    token_response(&token)
}

/// Handle current user lookup
///
/// GET /api/v1/auth/user
///
/// ## Response
///
/// ```json
/// { "id": 1, "username": "alice" }
/// ```
#[instrument(skip_all, name = "keel.web.handlers.user")]
pub async fn handle_user(
    State(state): State<AuthHandlerState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    match state.users.find(user_id).await {
        Ok(user) => Ok(Json(user)),
        Err(StoreError::UserIdNotFound) => Err(ApiError::invalid_field("id", "user not found")),
        Err(e) => Err(ApiError::Internal(format!("find user error: {e}"))),
    }
}

/// Runs bcrypt off the async workers. A malformed stored hash counts as a
/// mismatch.
async fn password_matches(
    password: SecretString,
    hash: String,
) -> Result<bool, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || {
        verify_password(password.expose_secret(), &hash)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?;

    match outcome {
        Ok(matched) => Ok(matched),
        Err(e @ CryptoError::Verification(_)) => {
            tracing::warn!(target: "keel.web.handlers.auth", error = %e, "Stored password hash is unusable");
            Ok(false)
        }
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

fn token_response(token: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(token)
        .map_err(|e| ApiError::Internal(format!("token is not a valid header value: {e}")))?;

    Ok(([(AUTHORIZATION, value)], Json("OK")).into_response())
}
