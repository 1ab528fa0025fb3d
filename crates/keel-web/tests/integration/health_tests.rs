//! E2E tests for the health endpoints.

use keel_test_utils::server_harness::{TestServer, TEST_VERSION};
use reqwest::StatusCode;

/// Both health paths answer any method without a token.
#[tokio::test]
async fn test_health_endpoints_answer_any_method() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    for path in ["/healthz", "/api/v1/healthz"] {
        for method in [reqwest::Method::GET, reqwest::Method::POST, reqwest::Method::HEAD] {
            let response = client
                .request(method.clone(), format!("{}{}", server.url(), path))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK, "{method} {path}");
        }

        let body: String = client
            .get(format!("{}{}", server.url(), path))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(body, format!("current running version: {TEST_VERSION}"));
    }

    Ok(())
}

/// A garbage token does not block health checks.
#[tokio::test]
async fn test_health_ignores_authorization_header() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/healthz", server.url()))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
