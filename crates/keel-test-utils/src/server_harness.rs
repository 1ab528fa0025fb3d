//! Test server harness for E2E testing
//!
//! Provides TestServer for spawning real Keel servers in tests.

use crate::fixtures::{seeded_user_store, test_engine, TEST_PASSWORD, TEST_USERNAME};
use keel_jwt::header::bearer;
use keel_jwt::TokenEngine;
use keel_web::routes::{self, AuthConfig, RouterConfig, AUTH_LOGIN_PATH};
use keel_web::stores::{InMemorySettingStore, SettingStore, UserStore};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Version reported by test servers' health endpoints.
pub const TEST_VERSION: &str = "test-1.0.0";

/// Test harness for spawning a Keel server in E2E tests
///
/// The server task is aborted when the harness is dropped.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> anyhow::Result<()> {
///     let server = TestServer::spawn().await?;
///     let response = reqwest::Client::new()
///         .get(format!("{}/healthz", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestServer {
    addr: SocketAddr,
    engine: Arc<dyn TokenEngine>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server with the test engine, the seeded user store and an
    /// empty setting store.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawn a server with custom collaborators
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Build routes with keel-web's real route builder
    /// - Serve in a background task
    pub async fn spawn_with(options: TestServerOptions) -> Result<Self, anyhow::Error> {
        let engine = options.engine.unwrap_or_else(test_engine);
        let user_store: Arc<dyn UserStore> = match options.user_store {
            Some(store) => store,
            None => seeded_user_store().await,
        };
        let setting_store: Arc<dyn SettingStore> = match options.setting_store {
            Some(store) => store,
            None => Arc::new(InMemorySettingStore::new()),
        };

        let app = routes::build_routes(RouterConfig {
            version: TEST_VERSION.to_string(),
            auth: Some(AuthConfig {
                engine: Some(Arc::clone(&engine)),
                skip_auth_paths: options.skip_auth_paths,
                user_store: Some(user_store),
                setting_store: Some(setting_store),
                setting_keys_whitelist: options.setting_keys_whitelist,
            }),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            engine,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Engine the server validates tokens with
    pub fn engine(&self) -> &Arc<dyn TokenEngine> {
        &self.engine
    }

    /// `Bearer` header value for a freshly signed identity token.
    pub fn bearer_for(&self, id: u64) -> String {
        let token = self
            .engine
            .signed_string_for_identity(id)
            .expect("signing test token");
        bearer(&token)
    }

    /// Log in and return the token from the `Authorization` response header.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = reqwest::Client::new()
            .post(format!("{}{}", self.url(), AUTH_LOGIN_PATH))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        anyhow::ensure!(
            response.status().is_success(),
            "login failed with status {}",
            response.status()
        );

        let token = response
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .ok_or_else(|| anyhow::anyhow!("login response has no Authorization header"))?
            .to_str()?
            .to_string();

        Ok(token)
    }

    /// Log in as the seeded test user.
    pub async fn login_seeded(&self) -> Result<String, anyhow::Error> {
        self.login(TEST_USERNAME, TEST_PASSWORD).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Collaborator overrides for [`TestServer::spawn_with`].
#[derive(Default)]
pub struct TestServerOptions {
    pub engine: Option<Arc<dyn TokenEngine>>,
    pub user_store: Option<Arc<dyn UserStore>>,
    pub setting_store: Option<Arc<dyn SettingStore>>,
    pub skip_auth_paths: Vec<String>,
    pub setting_keys_whitelist: Vec<String>,
}
