//! Serve command - runs one front-end service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use gateway_config::{EnvStore, ServiceConfig, ServiceKind};
use gateway_server::{AppState, Server};
use gateway_telemetry::{init_logging, LoggingConfig};

use crate::{cli::verbosity_level, output};

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Service to run (quiz, material)
    pub service: ServiceKind,

    /// Configuration file path
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (default: the service's port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Also write logs to `<dir>/<service>.log`
    #[arg(long, env = "GATEWAY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Resolve the configuration for a service, applying command-line overrides last
fn load_config(args: &ServeArgs) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(args.config.as_deref(), &EnvStore)
        .context("Failed to load configuration")?;

    config.service = args.service;
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if args.port.is_some() {
        config.server.port = args.port;
    }
    if args.log_dir.is_some() {
        config.logging.dir.clone_from(&args.log_dir);
    }

    Ok(config)
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, verbose: u8, json: bool) -> Result<()> {
    let config = load_config(&args)?;

    let level = if verbose > 0 {
        verbosity_level(verbose).to_string()
    } else {
        config.logging.level.clone()
    };
    let logging = LoggingConfig::new(config.service.service_name())
        .with_level(level)
        .with_json(json || config.logging.json)
        .with_file(config.log_file());
    init_logging(&logging).context("Failed to initialize logging")?;

    output::info(&format!(
        "Starting {} on {}:{}",
        config.service.service_name(),
        config.server.host,
        config.port()
    ));

    let state = AppState::builder()
        .config(config)
        .shared_config_store(Arc::new(EnvStore))
        .build()
        .context("Failed to build application state")?;

    Server::new(state).run().await.context("Server error")?;

    output::info("Service stopped");
    Ok(())
}
