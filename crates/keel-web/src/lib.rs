//! Keel Web Library
//!
//! Token authentication for axum services: login, token refresh, the auth
//! middleware and the request extractors that read its result.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `context` - Request extractors (`AuthUser`, `JsonBody`, `QueryParams`, `IdParam`)
//! - `crypto` - Password hashing
//! - `errors` - Error types and the JSON error envelope
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication middleware
//! - `models` - Data models
//! - `routes` - Router assembly
//! - `stores` - User and setting storage

pub mod config;
pub mod context;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod stores;
