//! Request-context extractors.
//!
//! - [`AuthUser`] - numeric identity from the claims left by the auth middleware
//! - [`JsonBody`] / [`QueryParams`] - decoding with the standard error envelope
//! - [`IdParam`] - lenient `:id` path parameter
//!
//! Decode failures reject with a 400 envelope instead of axum's plain-text
//! rejection body.

use crate::errors::ApiError;
use crate::middleware::AuthClaims;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use keel_jwt::claims::extract_identity;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Name of the identity path parameter.
pub const ID_PARAM: &str = "id";

/// Parse an unsigned integer, reading anything unparseable as 0.
#[must_use]
pub fn parse_uint(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

/// Identity of the authenticated caller.
///
/// Rejects with 401 when the request carries no validated claims or the
/// claims hold no usable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub u64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let AuthClaims(claims) = parts.extensions.get::<AuthClaims>().ok_or_else(|| {
            tracing::debug!(target: "keel.web.context", "No validated claims on request");
            ApiError::Unauthorized
        })?;

        extract_identity(claims).map(AuthUser).map_err(|e| {
            tracing::debug!(target: "keel.web.context", error = %e, "Claims carry no identity");
            ApiError::Unauthorized
        })
    }
}

/// JSON request body; decode failures become a 400 envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::status(
                StatusCode::BAD_REQUEST,
                format!("JSON decode error: {}", rejection.body_text()),
            )),
        }
    }
}

/// Query string parameters; decode failures become a 400 envelope.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::status(
                StatusCode::BAD_REQUEST,
                format!("query decode error: {}", rejection.body_text()),
            )),
        }
    }
}

/// The `:id` path parameter. Missing or malformed values read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub u64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(params)| params.get(ID_PARAM).map(|v| parse_uint(v)))
            .unwrap_or(0);

        Ok(IdParam(id))
    }
}
