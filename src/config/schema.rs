//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! application. The document is decoded once at startup and is immutable
//! afterwards; all types derive Serde serialization for diagnostic dumps.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Root configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct AppConfig {
    /// Application-wide toggles.
    pub main: MainConfig,

    /// Server bind settings.
    pub server: ServerConfig,

    /// Logging pipeline description (formatters, handlers, loggers).
    pub logging: LoggingConfig,
}

/// Application-wide toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MainConfig {
    /// Allow cross-origin browser clients to call the server.
    pub enable_cors: bool,
}

/// Server bind settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port (1-65535).
    pub port: u16,

    /// Set SO_REUSEADDR on the listening socket.
    pub reuse_address: bool,

    /// Set SO_REUSEPORT on the listening socket.
    pub reuse_port: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            reuse_address: false,
            reuse_port: false,
        }
    }
}

/// Logging pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    /// Schema version of the logging section. Fixed at 1.
    pub version: u32,

    /// Disable loggers that existed before the pipeline is installed.
    pub disable_existing_loggers: bool,

    /// Named formatters referenced by handlers.
    pub formatters: BTreeMap<String, FormatterConfig>,

    /// Named handlers referenced by loggers.
    pub handlers: BTreeMap<String, HandlerConfig>,

    /// Named logger channels.
    pub loggers: BTreeMap<String, LoggerConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            version: 1,
            disable_existing_loggers: false,
            formatters: BTreeMap::new(),
            handlers: BTreeMap::new(),
            loggers: BTreeMap::new(),
        }
    }
}

/// A named formatter: how a log record is rendered.
///
/// A closed set of kinds rather than a runtime-selected class name, so an
/// unknown formatter implementation is rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormatterConfig {
    /// Renders records through a message template.
    Pattern {
        /// Message template string.
        format: String,
    },

    /// Structured formatter for a remote log shipper. Auxiliary metadata
    /// fields are attached to every record.
    Logstash {
        /// Message type tag on every shipped record (default "masm").
        message_type: String,

        /// Static fields attached to every shipped record.
        extra: BTreeMap<String, String>,
    },
}

/// A named handler: a sink receiving records at or above a minimum severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerConfig {
    /// Sink kind and its target.
    #[serde(flatten)]
    pub kind: HandlerKind,

    /// Minimum severity this handler accepts.
    pub level: Level,

    /// Name of the formatter rendering records for this handler.
    pub formatter: String,
}

/// Where a handler writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HandlerKind {
    /// Write to a console stream.
    Console {
        /// Target stream.
        stream: ConsoleStream,
    },

    /// Write to the system log socket.
    Syslog {
        /// Socket path (default "/dev/log").
        address: String,
    },
}

/// Console output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// A named logger channel routing records to handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerConfig {
    /// Minimum severity this channel accepts.
    pub level: Level,

    /// Ordered handler references. Records are delivered in this order.
    pub handlers: Vec<String>,

    /// Forward records to the parent channel as well.
    pub propagate: bool,
}

/// Log record severity. The set is fixed and totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// All level names, in ascending severity.
    pub const NAMES: [&'static str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // WARN and FATAL are accepted aliases for compatibility with
        // documents written against the old runtime.
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("info".parse::<Level>(), Ok(Level::Info));
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warning));
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warning));
        assert_eq!("FATAL".parse::<Level>(), Ok(Level::Critical));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_display_round_trip() {
        for name in Level::NAMES {
            let level: Level = name.parse().unwrap();
            assert_eq!(level.to_string(), name);
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(!config.main.enable_cors);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.version, 1);
        assert!(config.logging.formatters.is_empty());
    }
}
