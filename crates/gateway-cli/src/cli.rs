//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// AI Gateway - provider-agnostic AI invocation and study-assistant services
#[derive(Parser, Debug)]
#[command(name = "ai-gateway-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one prompt to a provider and print the generated text
    Invoke(commands::invoke::InvokeArgs),

    /// Run one front-end service
    #[command(visible_alias = "start")]
    Serve(commands::serve::ServeArgs),

    /// Check the health of the running services
    Health(commands::health::HealthArgs),

    /// Start every service that is not already running and verify it
    #[command(name = "run-all")]
    RunAll(commands::run_all::RunAllArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Invoke(args) => commands::invoke::execute(args, self.json).await,
            Commands::Serve(args) => commands::serve::execute(args, self.verbose, self.json).await,
            Commands::Health(args) => commands::health::execute(args, self.json).await,
            Commands::RunAll(args) => commands::run_all::execute(args, self.json).await,
        }
    }
}

/// Log level for a `-v` count
pub fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
