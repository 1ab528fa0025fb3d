//! Keel web error types.
//!
//! Every error reaches the client as the same JSON envelope:
//!
//! ```json
//! { "code": 422, "message": "username not exist", "details": { "username": "username not exist" } }
//! ```
//!
//! Internal errors are logged server-side; clients only see `"server error"`.
//! Token failures collapse to a single generic 401.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field-level error details, keyed by input name.
pub type ErrorDetails = BTreeMap<String, String>;

/// Message used for `InvalidInput` without details.
pub const INVALID_INPUT_MESSAGE: &str = "invalid input";

/// Message sent for every authentication failure.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// Message sent in place of internal error detail.
pub const SERVER_ERROR_MESSAGE: &str = "server error";

/// Standard error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Mirrors the HTTP status code.
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            details: None,
        }
    }

    /// 422 envelope whose message is the first detail value.
    #[must_use]
    pub fn invalid_input(details: &ErrorDetails) -> Self {
        let message = details
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| INVALID_INPUT_MESSAGE.to_string());

        Self {
            code: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            message,
            details: (!details.is_empty()).then(|| details.clone()),
        }
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            let rendered: Vec<String> = details.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            write!(f, " ({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Keel web error type.
///
/// Maps to HTTP status codes:
/// - Status: the carried status
/// - InvalidInput: 422 Unprocessable Entity
/// - Unauthorized: 401 Unauthorized
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("[{}] {message}", .status.as_u16())]
    Status { status: StatusCode, message: String },

    #[error("{}", ErrorEnvelope::invalid_input(.0))]
    InvalidInput(ErrorDetails),

    #[error("[401] unauthorized")]
    Unauthorized,

    #[error("[500] {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// `InvalidInput` with a single detail.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput(BTreeMap::from([(field.into(), reason.into())]))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Status { status, .. } => *status,
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The envelope sent to the client.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            ApiError::Status { status, message } => ErrorEnvelope::new(*status, message.clone()),
            ApiError::InvalidInput(details) => ErrorEnvelope::invalid_input(details),
            ApiError::Unauthorized => {
                ErrorEnvelope::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
            }
            ApiError::Internal(_) => {
                ErrorEnvelope::new(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            // Log actual error server-side, return generic message to client
            tracing::error!(target: "keel.web.errors", error = %detail, "Request aborted with internal error");
        }

        let status = self.status_code();
        let mut response = (status, Json(self.envelope())).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
