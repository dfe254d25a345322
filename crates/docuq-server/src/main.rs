//! DocuQ server - ask questions about uploaded PDFs.

use anyhow::Result;
use clap::Parser;
use docuq_server::{config, logging, server};
use std::path::PathBuf;

use config::{API_KEY_VAR, Config};
use logging::{LogConfig, LogFormat};

/// DocuQ - interactive PDF questioning.
#[derive(Parser, Debug)]
#[command(name = "docuq-server")]
#[command(about = "Upload a PDF, ask a question, get an answer from OCR + a hosted chat model")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Override bind address from config
    #[arg(long)]
    host: Option<String>,

    /// Override the Q&A log database path
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Enable verbose logging (INFO level for all targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "pipeline=debug").
    /// Can be specified multiple times. Targets are prefixed with "docuq::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A .env file in the working directory may carry MISTRAL_API_KEY or RUST_LOG
    let dotenv_path = dotenvy::dotenv().ok();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    if let Some(path) = dotenv_path {
        tracing::debug!(target: "docuq::startup", "Loaded environment from {}", path.display());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    tracing::info!(
        target: "docuq::startup",
        "Loaded configuration (port: {}, db: {})",
        config.port,
        config.db_path.display()
    );

    server::run(config, std::env::var(API_KEY_VAR).ok()).await
}
