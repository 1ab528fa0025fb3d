//! HTTP routes for the Keel web layer.
//!
//! Which routes exist depends on the collaborators supplied in
//! [`RouterConfig`]:
//!
//! | Route | Requires |
//! |---|---|
//! | `/healthz`, `/api/v1/healthz` (any method) | always |
//! | `POST /api/v1/auth/login`, `GET /api/v1/auth/refresh`, `GET /api/v1/auth/user` | engine + user store |
//! | `GET /api/v1/settings`, `PUT /api/v1/settings` | setting store |
//!
//! With an engine configured, every path except the skip list (configured
//! paths, health paths and the login path) requires a valid token.

use crate::errors::ApiError;
use crate::handlers::{
    get_settings, handle_login, handle_refresh, handle_user, health_check, set_settings,
    AuthHandlerState, HealthState, SettingsState,
};
use crate::middleware::{require_auth, AuthMiddlewareState};
use crate::stores::{SettingStore, UserStore};
use axum::{
    http::{header::ALLOW, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use keel_jwt::TokenEngine;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Health probe paths. Never traced, never authenticated.
pub const HEALTH_CHECK_PATHS: [&str; 2] = ["/healthz", "/api/v1/healthz"];

pub const AUTH_LOGIN_PATH: &str = "/api/v1/auth/login";
pub const AUTH_REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const AUTH_USER_PATH: &str = "/api/v1/auth/user";
pub const SETTINGS_PATH: &str = "/api/v1/settings";

/// Authentication collaborators.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Token engine. Without one, no route is authenticated.
    pub engine: Option<Arc<dyn TokenEngine>>,

    /// Extra paths that bypass authentication.
    pub skip_auth_paths: Vec<String>,

    pub user_store: Option<Arc<dyn UserStore>>,

    pub setting_store: Option<Arc<dyn SettingStore>>,

    /// Allowed setting keys. Empty allows every key.
    pub setting_keys_whitelist: Vec<String>,
}

/// Router configuration.
#[derive(Clone, Default)]
pub struct RouterConfig {
    /// Version reported by the health endpoints.
    pub version: String,

    pub auth: Option<AuthConfig>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - Health endpoints (untraced)
/// - Auth and settings endpoints, per the configured collaborators
/// - 404 `"page not found"` and 405 `"method not allowed"` envelopes
/// - TraceLayer for request logging
/// - Auth middleware (outermost) when an engine is configured
pub fn build_routes(config: RouterConfig) -> Router {
    let mut api_routes = Router::new();

    if let Some(auth) = &config.auth {
        if let (Some(engine), Some(users)) = (&auth.engine, &auth.user_store) {
            let state = AuthHandlerState {
                engine: Arc::clone(engine),
                users: Arc::clone(users),
            };
            api_routes = api_routes.merge(
                Router::new()
                    .route(AUTH_LOGIN_PATH, post(handle_login))
                    .route(AUTH_REFRESH_PATH, get(handle_refresh))
                    .route(AUTH_USER_PATH, get(handle_user))
                    .with_state(state),
            );
        }

        if let Some(store) = &auth.setting_store {
            let state = SettingsState::new(Arc::clone(store), auth.setting_keys_whitelist.clone());
            api_routes = api_routes.merge(
                Router::new()
                    .route(SETTINGS_PATH, get(get_settings).put(set_settings))
                    .with_state(state),
            );
        }
    }

    // Health routes are merged after the trace layer so probes stay out of the logs
    let health_routes = HEALTH_CHECK_PATHS
        .iter()
        .fold(Router::new(), |router, path| {
            router.route(path, any(health_check))
        })
        .with_state(HealthState::new(&config.version));

    let mut app = api_routes
        .fallback(page_not_found)
        .layer(TraceLayer::new_for_http())
        .merge(health_routes)
        .layer(middleware::map_response(method_not_allowed_envelope));

    if let Some(AuthConfig {
        engine: Some(engine),
        skip_auth_paths,
        ..
    }) = config.auth
    {
        let skip_paths = skip_auth_paths
            .into_iter()
            .chain(HEALTH_CHECK_PATHS.iter().map(|path| (*path).to_string()))
            .chain(std::iter::once(AUTH_LOGIN_PATH.to_string()));

        app = app.layer(middleware::from_fn_with_state(
            AuthMiddlewareState::new(engine, skip_paths),
            require_auth,
        ));
    }

    app
}

async fn page_not_found() -> ApiError {
    ApiError::status(StatusCode::NOT_FOUND, "page not found")
}

/// Replaces axum's empty 405 body with the standard envelope, keeping `Allow`.
async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut replaced =
        ApiError::status(StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(ALLOW, allow);
    }
    replaced
}
