//! Document decoding.
//!
//! # Responsibilities
//! - Convert a parsed value tree into the typed schema
//! - Name the full dotted key path in every diagnostic
//! - Reject out-of-domain values (port range, severity names, kinds)
//!
//! # Design Decisions
//! - Decoding is structural and fails on the first error; semantic checks
//!   that can be collected in bulk live in validation.rs
//! - Unknown extra keys are ignored for forward compatibility
//! - An explicit null is treated the same as an absent key

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::config::schema::{
    AppConfig, ConsoleStream, FormatterConfig, HandlerConfig, HandlerKind, Level, LoggerConfig,
    LoggingConfig, MainConfig, ServerConfig,
};
use crate::config::validation::ValidationError;

/// Decode a parsed document into the typed configuration.
pub fn decode_document(root: &Value) -> Result<AppConfig, ValidationError> {
    let root = as_mapping(root, "<document>")?;

    let main = match section(root, "main")? {
        Some(map) => MainConfig {
            enable_cors: optional_bool(map, "main", "enable_cors", false)?,
        },
        None => MainConfig::default(),
    };

    let server = decode_server(root)?;

    let logging = match section(root, "logging")? {
        Some(map) => decode_logging(map)?,
        None => LoggingConfig::default(),
    };

    Ok(AppConfig {
        main,
        server,
        logging,
    })
}

fn decode_server(root: &Mapping) -> Result<ServerConfig, ValidationError> {
    let map = match section(root, "server")? {
        Some(map) => map,
        None => {
            return Err(ValidationError::MissingKey {
                path: "server".to_string(),
            })
        }
    };

    Ok(ServerConfig {
        host: require_str(map, "server", "host")?.to_string(),
        port: decode_port(map)?,
        reuse_address: optional_bool(map, "server", "reuse_address", false)?,
        reuse_port: optional_bool(map, "server", "reuse_port", false)?,
    })
}

fn decode_port(map: &Mapping) -> Result<u16, ValidationError> {
    let value = require_value(map, "server", "port")?;
    let port = value
        .as_i64()
        .ok_or_else(|| type_mismatch("server.port", "integer", value))?;

    if !(1..=65535).contains(&port) {
        return Err(ValidationError::InvalidValue {
            path: "server.port".to_string(),
            reason: format!("port {port} outside 1-65535"),
        });
    }

    Ok(port as u16)
}

fn decode_logging(map: &Mapping) -> Result<LoggingConfig, ValidationError> {
    let version = decode_version(map)?;
    let disable_existing_loggers = optional_bool(map, "logging", "disable_existing_loggers", false)?;

    let mut formatters = BTreeMap::new();
    for (name, value) in named_entries(map, "logging", "formatters")? {
        let path = format!("logging.formatters.{name}");
        formatters.insert(name, decode_formatter(&path, value)?);
    }

    let mut handlers = BTreeMap::new();
    for (name, value) in named_entries(map, "logging", "handlers")? {
        let path = format!("logging.handlers.{name}");
        handlers.insert(name, decode_handler(&path, value)?);
    }

    let mut loggers = BTreeMap::new();
    for (name, value) in named_entries(map, "logging", "loggers")? {
        let path = format!("logging.loggers.{name}");
        loggers.insert(name, decode_logger(&path, value)?);
    }

    Ok(LoggingConfig {
        version,
        disable_existing_loggers,
        formatters,
        handlers,
        loggers,
    })
}

fn decode_version(map: &Mapping) -> Result<u32, ValidationError> {
    let value = match entry(map, "version") {
        Some(value) => value,
        None => return Ok(1),
    };

    // i64, so a negative version is reported as out-of-domain.
    let version = value
        .as_i64()
        .ok_or_else(|| type_mismatch("logging.version", "integer", value))?;

    if version != 1 {
        return Err(ValidationError::InvalidValue {
            path: "logging.version".to_string(),
            reason: format!("unsupported logging schema version {version} (expected 1)"),
        });
    }

    Ok(version as u32)
}

fn decode_formatter(path: &str, value: &Value) -> Result<FormatterConfig, ValidationError> {
    let map = as_mapping(value, path)?;

    match require_str(map, path, "kind")? {
        "pattern" => Ok(FormatterConfig::Pattern {
            format: require_str(map, path, "format")?.to_string(),
        }),
        "logstash" => Ok(FormatterConfig::Logstash {
            message_type: optional_str(map, path, "message_type", "masm")?,
            extra: decode_extra(map, path)?,
        }),
        other => Err(ValidationError::InvalidValue {
            path: format!("{path}.kind"),
            reason: format!("unknown formatter kind `{other}` (expected pattern or logstash)"),
        }),
    }
}

fn decode_extra(map: &Mapping, parent: &str) -> Result<BTreeMap<String, String>, ValidationError> {
    let value = match entry(map, "extra") {
        Some(value) => value,
        None => return Ok(BTreeMap::new()),
    };

    let path = format!("{parent}.extra");
    let entries = as_mapping(value, &path)?;

    let mut extra = BTreeMap::new();
    for (key, value) in entries {
        let key = string_key(key, &path)?;
        let field_path = format!("{path}.{key}");
        let value = value
            .as_str()
            .ok_or_else(|| type_mismatch(&field_path, "string", value))?;
        extra.insert(key, value.to_string());
    }

    Ok(extra)
}

fn decode_handler(path: &str, value: &Value) -> Result<HandlerConfig, ValidationError> {
    let map = as_mapping(value, path)?;

    let kind = match require_str(map, path, "kind")? {
        "console" => HandlerKind::Console {
            stream: decode_stream(map, path)?,
        },
        "syslog" => HandlerKind::Syslog {
            address: optional_str(map, path, "address", "/dev/log")?,
        },
        other => {
            return Err(ValidationError::InvalidValue {
                path: format!("{path}.kind"),
                reason: format!("unknown handler kind `{other}` (expected console or syslog)"),
            })
        }
    };

    Ok(HandlerConfig {
        kind,
        level: decode_level(map, path)?,
        formatter: require_str(map, path, "formatter")?.to_string(),
    })
}

fn decode_stream(map: &Mapping, parent: &str) -> Result<ConsoleStream, ValidationError> {
    match optional_str(map, parent, "stream", "stdout")?.as_str() {
        "stdout" => Ok(ConsoleStream::Stdout),
        "stderr" => Ok(ConsoleStream::Stderr),
        other => Err(ValidationError::InvalidValue {
            path: format!("{parent}.stream"),
            reason: format!("unknown stream `{other}` (expected stdout or stderr)"),
        }),
    }
}

fn decode_logger(path: &str, value: &Value) -> Result<LoggerConfig, ValidationError> {
    let map = as_mapping(value, path)?;

    let handlers_path = format!("{path}.handlers");
    let value = require_value(map, path, "handlers")?;
    let items = value
        .as_sequence()
        .ok_or_else(|| type_mismatch(&handlers_path, "sequence", value))?;

    let mut handlers = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{handlers_path}[{index}]");
        let name = item
            .as_str()
            .ok_or_else(|| type_mismatch(&item_path, "string", item))?;
        handlers.push(name.to_string());
    }

    Ok(LoggerConfig {
        level: decode_level(map, path)?,
        handlers,
        propagate: optional_bool(map, path, "propagate", false)?,
    })
}

fn decode_level(map: &Mapping, parent: &str) -> Result<Level, ValidationError> {
    let name = require_str(map, parent, "level")?;

    name.parse().map_err(|()| ValidationError::InvalidValue {
        path: format!("{parent}.level"),
        reason: format!("unknown level `{}` (expected one of {})", name, Level::NAMES.join(", ")),
    })
}

// --- value tree helpers ---

fn entry<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    match map.get(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

/// Optional top-level or nested section. Present but non-mapping is a
/// type mismatch.
fn section<'a>(map: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>, ValidationError> {
    match entry(map, key) {
        Some(value) => as_mapping(value, key).map(Some),
        None => Ok(None),
    }
}

fn as_mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Mapping, ValidationError> {
    value
        .as_mapping()
        .ok_or_else(|| type_mismatch(path, "mapping", value))
}

fn require_value<'a>(map: &'a Mapping, parent: &str, key: &str) -> Result<&'a Value, ValidationError> {
    entry(map, key).ok_or_else(|| ValidationError::MissingKey {
        path: join(parent, key),
    })
}

fn require_str<'a>(map: &'a Mapping, parent: &str, key: &str) -> Result<&'a str, ValidationError> {
    let value = require_value(map, parent, key)?;
    value
        .as_str()
        .ok_or_else(|| type_mismatch(&join(parent, key), "string", value))
}

fn optional_str(
    map: &Mapping,
    parent: &str,
    key: &str,
    default: &str,
) -> Result<String, ValidationError> {
    match entry(map, key) {
        Some(value) => value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| type_mismatch(&join(parent, key), "string", value)),
        None => Ok(default.to_string()),
    }
}

fn optional_bool(
    map: &Mapping,
    parent: &str,
    key: &str,
    default: bool,
) -> Result<bool, ValidationError> {
    match entry(map, key) {
        Some(value) => value
            .as_bool()
            .ok_or_else(|| type_mismatch(&join(parent, key), "boolean", value)),
        None => Ok(default),
    }
}

/// Entries of an optional named sub-mapping (formatters/handlers/loggers).
fn named_entries<'a>(
    map: &'a Mapping,
    parent: &str,
    key: &str,
) -> Result<Vec<(String, &'a Value)>, ValidationError> {
    let path = join(parent, key);
    let entries = match entry(map, key) {
        Some(value) => as_mapping(value, &path)?,
        None => return Ok(Vec::new()),
    };

    let mut named = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        named.push((string_key(name, &path)?, value));
    }
    Ok(named)
}

fn string_key(key: &Value, parent: &str) -> Result<String, ValidationError> {
    key.as_str()
        .map(ToString::to_string)
        .ok_or_else(|| type_mismatch(parent, "string key", key))
}

fn type_mismatch(path: &str, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: value_kind(found).to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
