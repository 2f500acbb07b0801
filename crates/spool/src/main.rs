//! Spool - pipe stdin into a rotating log file
//!
//! # Usage
//!
//! ```bash
//! # Defaults from the config file
//! my-service 2>&1 | spool --config configs/spool.toml
//!
//! # Everything on the command line
//! my-service | spool --path logs/svc.log --max-file-size 1048576 --backup-count 5
//! ```

mod pipe;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spool_config::{Config, DiagnosticFormat, DiagnosticStream, DiagnosticsConfig};
use spool_sinks::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Spool - rotation-aware log file writer
#[derive(Parser, Debug)]
#[command(name = "spool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SPOOL_CONFIG")]
    config: Option<PathBuf>,

    /// Live log file (overrides sink.path)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Rotation threshold in bytes, 0 disables (overrides sink.max_file_size)
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Rotated files to keep (overrides sink.backup_count)
    #[arg(long)]
    backup_count: Option<usize>,

    /// Open and close the file on every line
    #[arg(long)]
    per_write: bool,

    /// Level assigned to each stdin line
    #[arg(long, default_value = "info")]
    line_level: Level,

    /// Diagnostic log level (overrides log.level and log.filter)
    #[arg(short, long)]
    log_level: Option<Level>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(&config.log)?;

    pipe::run(&cli, &config).await
}

/// Config file (if any), then CLI overrides, then validation
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            Config::parse_unvalidated(&contents)?
        }
        None => Config::default(),
    };

    if let Some(path) = &cli.path {
        config.sink.path = path.display().to_string();
    }
    if let Some(size) = cli.max_file_size {
        config.sink.max_file_size = size;
    }
    if let Some(count) = cli.backup_count {
        config.sink.backup_count = count;
    }
    if cli.per_write {
        config.sink.persistent_handle = false;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
        config.log.filter = None;
    }

    config.validate()?;
    Ok(config)
}

/// Initialize the tracing subscriber for diagnostics
fn init_logging(log: &DiagnosticsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(log.filter_directive())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log filter: {}", e))?;

    let to_stdout = log.stream == DiagnosticStream::Stdout;
    let registry = tracing_subscriber::registry().with(filter);

    match (log.format, to_stdout) {
        (DiagnosticFormat::Text, false) => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        (DiagnosticFormat::Text, true) => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
            .init(),
        (DiagnosticFormat::Json, false) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (DiagnosticFormat::Json, true) => registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .init(),
    }

    Ok(())
}
