//! Configuration check tool for the masm application.
//!
//! Loads the configuration document the server and logging frameworks
//! consume, validates it, and reports diagnostics naming the offending
//! key path. Exits non-zero on an invalid document so it can gate
//! deployments.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use masm_config::config::loader::{load_config, resolve_path, ConfigError};

#[derive(Parser)]
#[command(name = "masm-config")]
#[command(about = "Validate and inspect masm configuration files", long_about = None)]
struct Cli {
    /// Configuration file (falls back to $CONFIG_PATH, then config/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate, printing a summary
    Check,
    /// Load, validate, and re-emit the document as YAML
    Dump,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "masm_config=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let path = resolve_path(cli.config.as_deref());

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(error) => {
            report(&error);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check => {
            println!("{}: OK", path.display());
            println!("  server   {}:{}", config.server.host, config.server.port);
            println!(
                "  cors     {}",
                if config.main.enable_cors { "enabled" } else { "disabled" }
            );
            println!(
                "  logging  {} formatter(s), {} handler(s), {} logger(s)",
                config.logging.formatters.len(),
                config.logging.handlers.len(),
                config.logging.loggers.len()
            );
        }
        Commands::Dump => match serde_yaml::to_string(&config) {
            Ok(text) => print!("{text}"),
            Err(error) => {
                eprintln!("error: failed to serialize document: {error}");
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn report(error: &ConfigError) {
    match error {
        ConfigError::Validation(errors) => {
            for error in errors {
                eprintln!("error: {error}");
            }
        }
        other => eprintln!("error: {other}"),
    }
}
