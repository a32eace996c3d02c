//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & parse into a value tree)
//!     → decode.rs (typed schema, key-path diagnostics)
//!     → validation.rs (semantic checks, referential integrity)
//!     → AppConfig (validated, immutable)
//!     → handed to the server and logging frameworks at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; it has no further lifecycle
//! - Loading is all-or-nothing: the process must not start on an invalid
//!   document
//! - Structural defects (missing key, wrong type) fail fast with the
//!   offending key path; semantic defects are collected and reported
//!   together

pub mod decode;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_from_str, resolve_path, ConfigError};
pub use schema::AppConfig;
pub use schema::Level;
pub use validation::ValidationError;
