//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (decode.rs handles structural)
//! - Check referential integrity (handlers reference existing formatters,
//!   loggers reference existing handlers)
//! - Detect dead logger channels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single defect in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required key is absent.
    #[error("missing required key `{path}`")]
    MissingKey {
        /// Dotted path of the absent key.
        path: String,
    },

    /// A value has the wrong primitive type.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the offending value.
        path: String,
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        found: String,
    },

    /// A handler names an undefined formatter, or a logger names an
    /// undefined handler.
    #[error("`{referrer}` references undefined {target_kind} `{target}`")]
    UnresolvedReference {
        /// Dotted path of the referring entry.
        referrer: String,
        /// What was referenced ("formatter" or "handler").
        target_kind: &'static str,
        /// The unresolved name.
        target: String,
    },

    /// A value is well-typed but outside its allowed domain.
    #[error("invalid value at `{path}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending value.
        path: String,
        /// Human-readable explanation.
        reason: String,
    },
}

/// Check the semantic invariants of a decoded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, handler) in &config.logging.handlers {
        if !config.logging.formatters.contains_key(&handler.formatter) {
            errors.push(ValidationError::UnresolvedReference {
                referrer: format!("logging.handlers.{name}"),
                target_kind: "formatter",
                target: handler.formatter.clone(),
            });
        }
    }

    for (name, logger) in &config.logging.loggers {
        for handler in &logger.handlers {
            if !config.logging.handlers.contains_key(handler) {
                errors.push(ValidationError::UnresolvedReference {
                    referrer: format!("logging.loggers.{name}"),
                    target_kind: "handler",
                    target: handler.clone(),
                });
            }
        }

        // A channel with no handlers and no propagation drops every record.
        if logger.handlers.is_empty() && !logger.propagate {
            errors.push(ValidationError::InvalidValue {
                path: format!("logging.loggers.{name}"),
                reason: "no handlers and propagate is false; records would be dropped".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{
        ConsoleStream, FormatterConfig, HandlerConfig, HandlerKind, Level, LoggerConfig,
    };

    fn base_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.logging.formatters.insert(
            "default".to_string(),
            FormatterConfig::Pattern {
                format: "%(message)s".to_string(),
            },
        );
        config.logging.handlers.insert(
            "console".to_string(),
            HandlerConfig {
                kind: HandlerKind::Console {
                    stream: ConsoleStream::Stdout,
                },
                level: Level::Debug,
                formatter: "default".to_string(),
            },
        );
        config.logging.loggers.insert(
            "app".to_string(),
            LoggerConfig {
                level: Level::Info,
                handlers: vec!["console".to_string()],
                propagate: false,
            },
        );
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_handler_with_undefined_formatter() {
        let mut config = base_config();
        config
            .logging
            .handlers
            .get_mut("console")
            .unwrap()
            .formatter = "missing".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedReference {
                referrer: "logging.handlers.console".to_string(),
                target_kind: "formatter",
                target: "missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_logger_with_undefined_handler() {
        let mut config = base_config();
        config
            .logging
            .loggers
            .get_mut("app")
            .unwrap()
            .handlers
            .push("nowhere".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedReference {
                referrer: "logging.loggers.app".to_string(),
                target_kind: "handler",
                target: "nowhere".to_string(),
            }]
        );
    }

    #[test]
    fn test_dead_logger_channel() {
        let mut config = base_config();
        config.logging.loggers.insert(
            "quiet".to_string(),
            LoggerConfig {
                level: Level::Error,
                handlers: Vec::new(),
                propagate: false,
            },
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidValue { path, .. } if path == "logging.loggers.quiet"
        ));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = base_config();
        config
            .logging
            .handlers
            .get_mut("console")
            .unwrap()
            .formatter = "missing".to_string();
        config
            .logging
            .loggers
            .get_mut("app")
            .unwrap()
            .handlers
            .push("nowhere".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
