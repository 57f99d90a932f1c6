//! # AI Gateway
//!
//! Runs one study-assistant front-end service (quiz or material generator)
//! on top of the provider-agnostic AI gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Quiz generator on its default port (5104)
//! ai-gateway
//!
//! # Material generator from a config file
//! GATEWAY_CONFIG=/etc/ai-gateway/material.toml ai-gateway
//!
//! # Environment overrides
//! GATEWAY_SERVICE=material GATEWAY_PORT=9000 ai-gateway
//! ```

use anyhow::{Context, Result};
use gateway_config::{EnvStore, ServiceConfig};
use gateway_server::{AppState, Server};
use gateway_telemetry::{init_logging, LoggingConfig};
use std::sync::Arc;
use tracing::{error, info};

/// Application entry point
#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        error!(error = %format!("{e:#}"), "Application failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let store = Arc::new(EnvStore);
    let config = ServiceConfig::load(None, store.as_ref()).context("Failed to load configuration")?;

    let logging = LoggingConfig::new(config.service.service_name())
        .with_level(&config.logging.level)
        .with_json(config.logging.json)
        .with_file(config.log_file());
    init_logging(&logging).context("Failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        service = config.service.service_name(),
        host = %config.server.host,
        port = config.port(),
        provider = %config.ai.default_provider,
        "Configuration loaded"
    );

    let state = AppState::builder()
        .config(config)
        .shared_config_store(store)
        .build()
        .context("Failed to build application state")?;

    Server::new(state).run().await?;

    Ok(())
}
