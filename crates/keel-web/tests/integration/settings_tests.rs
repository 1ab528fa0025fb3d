//! E2E tests for per-user settings.

use keel_test_utils::{FailingStore, TestServer, TestServerOptions};
use keel_web::errors::ErrorEnvelope;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

fn whitelisted(keys: &[&str]) -> TestServerOptions {
    TestServerOptions {
        setting_keys_whitelist: keys.iter().map(|k| (*k).to_string()).collect(),
        ..TestServerOptions::default()
    }
}

/// Values written by one user are read back by that user only.
#[tokio::test]
async fn test_settings_are_scoped_per_user() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/settings", server.url());

    let response = client
        .put(&url)
        .query(&[("key", "theme")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .json(&json!({ "value": "dark" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: String = response.json().await?;
    assert_eq!(body, "OK");

    let mine: Value = client
        .get(&url)
        .query(&[("key", "theme")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(mine, json!({ "theme": "dark" }));

    let theirs: Value = client
        .get(&url)
        .query(&[("key", "theme")])
        .header(AUTHORIZATION, server.bearer_for(2))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(theirs, json!({ "theme": "" }));

    Ok(())
}

/// `keys` reads several settings at once; unset keys read as empty.
#[tokio::test]
async fn test_settings_multiple_keys() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/settings", server.url());

    client
        .put(&url)
        .query(&[("key", "lang")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .json(&json!({ "value": "en" }))
        .send()
        .await?
        .error_for_status()?;

    let settings: Value = client
        .get(&url)
        .query(&[("keys", "lang, theme")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(settings, json!({ "lang": "en", "theme": "" }));

    Ok(())
}

/// Keys outside the whitelist are rejected on read and write.
#[tokio::test]
async fn test_settings_whitelist_rejects_unknown_key() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn_with(whitelisted(&["theme"])).await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/settings", server.url());

    let response = client
        .put(&url)
        .query(&[("key", "secret_flag")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .json(&json!({ "value": "on" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let envelope: ErrorEnvelope = response.json().await?;
    assert_eq!(envelope.message, "key not allowed");
    assert!(envelope.details.is_some_and(|d| d.contains_key("key")));

    let response = client
        .get(&url)
        .query(&[("keys", "theme,secret_flag")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .get(&url)
        .query(&[("key", "theme")])
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// Settings require a token.
#[tokio::test]
async fn test_settings_require_token() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/settings?key=theme", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// A failing store surfaces as a generic 500.
#[tokio::test]
async fn test_settings_store_failure_returns_500() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn_with(TestServerOptions {
        setting_store: Some(Arc::new(FailingStore)),
        ..TestServerOptions::default()
    })
    .await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/settings?key=theme", server.url()))
        .header(AUTHORIZATION, server.bearer_for(1))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let envelope: ErrorEnvelope = response.json().await?;
    assert_eq!(envelope.message, "server error");

    Ok(())
}
