//! Theseus CLI - entry point
//!
//! ```text
//! theseus resolve --contract petstore.yaml GET /pets/42
//! theseus validate --contract petstore.yaml --method POST --path /pets --payload pet.json
//! theseus validate --schema pet.schema.yaml --payload pet.json
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr. The exit code is
//! 0 when the request resolves or the payload is valid, and 1 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use theseus::config::DEFAULT_ENV_PREFIX;
use theseus::{ConfigLoader, TheseusConfig};

mod resolve;
mod validate;

/// Default configuration file, used when present.
const DEFAULT_CONFIG_FILE: &str = "theseus.toml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve requests and validate payloads against OpenAPI contracts")]
struct Cli {
    /// Configuration file (TOML or JSON). Defaults to ./theseus.toml when present.
    #[arg(long, global = true, env = "THESEUS_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter override, e.g. `debug` or `theseus_paths=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a request method and path to a contract operation.
    Resolve(resolve::ResolveArgs),
    /// Validate a JSON payload against a request body or a standalone schema.
    Validate(validate::ValidateArgs),
}

fn load_config(cli: &Cli) -> anyhow::Result<TheseusConfig> {
    let loader = ConfigLoader::new().with_dotenv();
    let loader = match &cli.config {
        Some(path) => loader
            .with_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
    };

    let mut config = loader.with_env_prefix(DEFAULT_ENV_PREFIX).load()?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
        config.validate()?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    theseus_telemetry::init_logging(&config.logging).context("initializing logging")?;

    let success = match &cli.command {
        Commands::Resolve(args) => resolve::execute(args, &config)?,
        Commands::Validate(args) => validate::execute(args, &config)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Parses an HTTP method name, case-insensitively.
fn parse_method(name: &str) -> anyhow::Result<http::Method> {
    http::Method::from_bytes(name.to_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method '{name}'"))
}
