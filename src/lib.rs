//! Typed configuration for the masm web application.
//!
//! Defines the schema of the application's configuration document (server
//! bind settings, CORS toggle, logging pipeline), loads it from YAML or
//! TOML, and validates it before the process starts. The server and
//! logging frameworks that consume the validated document live elsewhere.

pub mod config;

pub use config::loader::{load_config, load_config_from_str, resolve_path};
pub use config::schema::AppConfig;
pub use config::{ConfigError, ValidationError};
