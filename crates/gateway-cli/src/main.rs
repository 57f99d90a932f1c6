//! AI Gateway CLI
//!
//! Command-line interface for invoking providers and running the
//! study-assistant services.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod probe;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // `serve` installs the service's own subscriber
    if !matches!(cli.command, Commands::Serve(_)) {
        init_tracing(cli.verbose, cli.json);
    }

    cli.execute().await
}

/// Initialize tracing based on verbosity and format.
fn init_tracing(verbose: u8, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::new(cli::verbosity_level(verbose));
    let subscriber = tracing_subscriber::registry().with(filter);

    let result = if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        subscriber
            .with(fmt::layer().with_target(verbose > 1).with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize tracing: {e}");
    }
}
