//! Configuration loading from disk.
//!
//! Loading is a one-shot, all-or-nothing operation performed before
//! anything else starts: read the document, decode it into the typed
//! schema, run semantic validation. Any failure is fatal to startup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

use crate::config::decode::decode_document;
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Default configuration file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed YAML.
    #[error("parse error: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    /// The document is not well-formed TOML.
    #[error("parse error: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The document is well-formed but violates the schema.
    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve the configuration file path.
///
/// Precedence: explicit argument, then the `CONFIG_PATH` environment
/// variable, then [`DEFAULT_CONFIG_PATH`].
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Load and validate a configuration file.
///
/// Files with a `.toml` extension are parsed as TOML; everything else is
/// parsed as YAML.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value = if path.extension().is_some_and(|ext| ext == "toml") {
        // Bridge TOML into the same value tree the decoder walks.
        let parsed: toml::Value = toml::from_str(&content)?;
        serde_yaml::to_value(&parsed)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let config = finish(&value)?;
    tracing::debug!(
        path = %path.display(),
        host = %config.server.host,
        port = config.server.port,
        loggers = config.logging.loggers.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Load and validate a configuration document from a YAML string.
pub fn load_config_from_str(text: &str) -> Result<AppConfig, ConfigError> {
    let value: Value = serde_yaml::from_str(text)?;
    finish(&value)
}

fn finish(value: &Value) -> Result<AppConfig, ConfigError> {
    let config = decode_document(value).map_err(|error| ConfigError::Validation(vec![error]))?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
main:
  enable_cors: true
server:
  host: 0.0.0.0
  port: 8080
  reuse_address: true
  reuse_port: true
logging:
  version: 1
  disable_existing_loggers: false
  formatters:
    default:
      kind: pattern
      format: "%(asctime)s %(levelname)s %(message)s"
  handlers:
    console:
      kind: console
      stream: stdout
      level: DEBUG
      formatter: default
  loggers:
    masm:
      level: INFO
      handlers: [console]
      propagate: false
"#;

    #[test]
    fn test_load_from_str() {
        let config = load_config_from_str(VALID).unwrap();
        assert!(config.main.enable_cors);
        assert!(config.server.reuse_port);
        assert_eq!(config.logging.loggers["masm"].handlers, vec!["console"]);
    }

    #[test]
    fn test_unresolved_reference_is_fatal() {
        let text = VALID.replace("formatter: default", "formatter: nope");
        let err = load_config_from_str(&text).unwrap_err();
        let ConfigError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedReference {
                referrer: "logging.handlers.console".to_string(),
                target_kind: "formatter",
                target: "nope".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_yaml() {
        let err = load_config_from_str("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml(_)));
    }

    #[test]
    fn test_resolve_path_explicit_wins() {
        let path = resolve_path(Some(Path::new("/etc/masm/config.yaml")));
        assert_eq!(path, PathBuf::from("/etc/masm/config.yaml"));
    }
}
