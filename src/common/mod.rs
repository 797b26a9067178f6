// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod migrations;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigError};
pub use error::AuthError;
pub use helpers::{safe_email_log, safe_token_log};
pub use state::AppState;
