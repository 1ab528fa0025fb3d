//! Keel Web
//!
//! Standalone server exposing the health, login, refresh, user and settings
//! endpoints backed by in-memory stores.

use common::observability::{init_tracing, ObservabilityConfig};
use common::secret::ExposeSecret;
use keel_jwt::{EngineConfig, HmacEngine, TokenEngine};
use keel_web::config::Config;
use keel_web::crypto::hash_password;
use keel_web::models::User;
use keel_web::routes::{self, AuthConfig, RouterConfig};
use keel_web::stores::{InMemorySettingStore, InMemoryUserStore, UserStore};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let vars: HashMap<String, String> = std::env::vars().collect();

    init_tracing(&ObservabilityConfig::from_vars(
        &vars,
        "keel_web=info,keel_jwt=info,tower_http=info",
    ))?;

    info!("Starting Keel Web");

    let config = Config::from_vars(&vars).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        jwt_lease_seconds = config.jwt_lease.as_secs(),
        skip_auth_paths = config.skip_auth_paths.len(),
        "Configuration loaded successfully"
    );

    let engine_config = EngineConfig::new(config.jwt_secret_bytes())?.with_lease(config.jwt_lease);
    let engine: Arc<dyn TokenEngine> = Arc::new(HmacEngine::new(&engine_config)?);

    let users = Arc::new(InMemoryUserStore::new());
    if let Some(seed) = &config.seed_user {
        let password = seed.password.expose_secret().to_string();
        let cost = config.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

        let id = users.next_id().await;
        users.save(User::new(id, seed.username.clone(), hash)).await?;
        info!(user_id = id, username = %seed.username, "Seed user created");
    }

    let user_store: Arc<dyn UserStore> = users;
    let app = routes::build_routes(RouterConfig {
        version: config.app_version.clone(),
        auth: Some(AuthConfig {
            engine: Some(engine),
            skip_auth_paths: config.skip_auth_paths.clone(),
            user_store: Some(user_store),
            setting_store: Some(Arc::new(InMemorySettingStore::new())),
            setting_keys_whitelist: config.setting_keys_whitelist.clone(),
        }),
    });

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Keel Web listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Keel Web shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
