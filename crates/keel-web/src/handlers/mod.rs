//! HTTP request handlers for the Keel web layer.

pub mod auth_handler;
pub mod health_handler;
pub mod settings_handler;

pub use auth_handler::{handle_login, handle_refresh, handle_user, AuthHandlerState};
pub use health_handler::{health_check, HealthState};
pub use settings_handler::{get_settings, set_settings, SettingsState};
