//! E2E tests for login, refresh, current user and the auth middleware.
//!
//! ## Test Categories
//!
//! - **Login**: credential checks and token issuance
//! - **Refresh**: re-issuing tokens for the current identity
//! - **User**: current user lookup
//! - **Middleware**: rejection of missing, malformed, foreign and expired tokens
//! - **Fallbacks**: 404 and 405 envelopes

use keel_jwt::header::bearer;
use keel_jwt::DEFAULT_LEASE;
use keel_test_utils::{
    engine_with_secret, fixed_clock_engine, FailingStore, TestServer, TestServerOptions,
    TokenAssertions, TEST_CLOCK_SECS, TEST_PASSWORD, TEST_USERNAME,
};
use keel_web::errors::ErrorEnvelope;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

async fn envelope(response: reqwest::Response) -> Result<ErrorEnvelope, anyhow::Error> {
    Ok(response.json().await?)
}

// ============================================================================
// Login Tests
// ============================================================================

/// Correct credentials return a token in the Authorization header.
#[tokio::test]
async fn test_login_happy_path() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK, "Login should succeed");

    let token = response
        .headers()
        .get(AUTHORIZATION)
        .expect("Authorization header")
        .to_str()?
        .to_string();
    let body: String = response.json().await?;
    assert_eq!(body, "OK");

    token
        .assert_valid_jwt()
        .assert_identity(1)
        .assert_lease(i64::try_from(DEFAULT_LEASE.as_secs())?);

    Ok(())
}

/// Unknown usernames fail with a 422 on the username field.
#[tokio::test]
async fn test_login_unknown_username_returns_422() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": "mallory", "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers().get(AUTHORIZATION).is_none());

    let envelope = envelope(response).await?;
    assert_eq!(envelope.code, 422);
    assert_eq!(envelope.message, "username not exist");
    assert_eq!(
        envelope.details.and_then(|d| d.get("username").cloned()),
        Some("username not exist".to_string())
    );

    Ok(())
}

/// A wrong password fails with a 422 on the password field.
#[tokio::test]
async fn test_login_wrong_password_returns_422() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": "wrong" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let envelope = envelope(response).await?;
    assert_eq!(envelope.message, "password not match");
    assert!(envelope
        .details
        .is_some_and(|d| d.contains_key("password")));

    Ok(())
}

/// A body that is not a login request is a 400.
#[tokio::test]
async fn test_login_malformed_body_returns_400() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let envelope = envelope(response).await?;
    assert_eq!(envelope.code, 400);
    assert!(envelope.message.starts_with("JSON decode error"));

    Ok(())
}

/// Store failures surface as a generic 500 without internal detail.
#[tokio::test]
async fn test_login_store_failure_returns_500() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn_with(TestServerOptions {
        user_store: Some(Arc::new(FailingStore)),
        ..TestServerOptions::default()
    })
    .await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let envelope = envelope(response).await?;
    assert_eq!(envelope.message, "server error");

    Ok(())
}

// ============================================================================
// Refresh and User Tests
// ============================================================================

/// A logged-in user can refresh and look themselves up.
#[tokio::test]
async fn test_refresh_and_user_with_login_token() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let token = server.login_seeded().await?;

    let response = client
        .get(format!("{}/api/v1/auth/refresh", server.url()))
        .header(AUTHORIZATION, bearer(&token))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let refreshed = response
        .headers()
        .get(AUTHORIZATION)
        .expect("Authorization header")
        .to_str()?
        .to_string();
    refreshed.assert_valid_jwt().assert_identity(1);

    let response = client
        .get(format!("{}/api/v1/auth/user", server.url()))
        .header(AUTHORIZATION, bearer(&refreshed))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let user: Value = response.json().await?;
    assert_eq!(user.get("id").and_then(Value::as_u64), Some(1));
    assert_eq!(
        user.get("username").and_then(Value::as_str),
        Some(TEST_USERNAME)
    );
    assert!(
        user.get("password_hash").is_none(),
        "Password hash must never be serialized"
    );

    Ok(())
}

/// A valid token for an identity with no user record is a 422 on id.
#[tokio::test]
async fn test_user_unknown_identity_returns_422() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/user", server.url()))
        .header(AUTHORIZATION, server.bearer_for(99))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let envelope = envelope(response).await?;
    assert_eq!(envelope.message, "user not found");

    Ok(())
}

/// A token carrying only a name has no identity for refresh.
#[tokio::test]
async fn test_refresh_with_name_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.engine().signed_string_for_name("test")?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/refresh", server.url()))
        .header(AUTHORIZATION, bearer(&token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

// ============================================================================
// Middleware Tests
// ============================================================================

/// Missing, short and garbage headers are all a generic 401.
#[tokio::test]
async fn test_protected_route_rejects_bad_headers() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/auth/user", server.url());

    let response = client.get(&url).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
    let envelope = envelope(response).await?;
    assert_eq!(envelope.code, 401);
    assert_eq!(envelope.message, "unauthorized");

    for header in ["Bear", "Bearer ", "Bearer a.b.c", "Bearer not-a-token"] {
        let response = client.get(&url).header(AUTHORIZATION, header).send().await?;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {header:?}"
        );
    }

    Ok(())
}

/// Tokens signed with another secret are rejected.
#[tokio::test]
async fn test_protected_route_rejects_foreign_secret() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = engine_with_secret("someone-else").signed_string_for_identity(1)?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/user", server.url()))
        .header(AUTHORIZATION, bearer(&token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// Tokens issued long ago with the right secret are expired.
#[tokio::test]
async fn test_protected_route_rejects_expired_token() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = fixed_clock_engine(TEST_CLOCK_SECS).signed_string_for_identity(1)?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/user", server.url()))
        .header(AUTHORIZATION, bearer(&token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let envelope = envelope(response).await?;
    assert_eq!(envelope.message, "unauthorized");

    Ok(())
}

/// The scheme prefix is stripped by position, not by name.
#[tokio::test]
async fn test_any_seven_byte_prefix_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.engine().signed_string_for_identity(1)?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/user", server.url()))
        .header(AUTHORIZATION, format!("Token: {token}"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// Configured skip paths bypass authentication.
#[tokio::test]
async fn test_skip_auth_paths_bypass_middleware() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn_with(TestServerOptions {
        skip_auth_paths: vec!["/api/v1/auth/user".to_string()],
        ..TestServerOptions::default()
    })
    .await?;

    // No claims reach the extractor, so the handler itself rejects
    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/user", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("www-authenticate").is_some());

    // Unknown skipped path reaches the fallback instead of the middleware
    let server = TestServer::spawn_with(TestServerOptions {
        skip_auth_paths: vec!["/public".to_string()],
        ..TestServerOptions::default()
    })
    .await?;

    let response = reqwest::Client::new()
        .get(format!("{}/public", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

// ============================================================================
// Fallback Tests
// ============================================================================

/// Unknown paths are 404 for authenticated callers.
#[tokio::test]
async fn test_unknown_path_returns_404_envelope() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/nowhere", server.url()))
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let envelope = envelope(response).await?;
    assert_eq!(envelope.code, 404);
    assert_eq!(envelope.message, "page not found");

    Ok(())
}

/// Wrong methods on known paths are 405 with an Allow header.
#[tokio::test]
async fn test_wrong_method_returns_405_envelope() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .delete(format!("{}/api/v1/auth/refresh", server.url()))
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().get("allow").is_some());
    let envelope = envelope(response).await?;
    assert_eq!(envelope.code, 405);
    assert_eq!(envelope.message, "method not allowed");

    Ok(())
}
