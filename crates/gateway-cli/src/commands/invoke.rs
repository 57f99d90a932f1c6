//! Invoke command - sends one prompt through the gateway.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use gateway_config::{EnvStore, ServiceConfig};
use gateway_core::{Extras, InvocationRequest};
use gateway_routing::Gateway;
use serde_json::Value;
use tracing::info;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the invoke command.
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Prompt text
    pub prompt: String,

    /// Provider name (openai, gemini)
    #[arg(short, long, env = "GATEWAY_AI_PROVIDER", default_value = "openai")]
    pub provider: String,

    /// Model name (default: the configured model for the provider)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Credential (default: <PROVIDER>_API_KEY from the environment)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Extra request body field as key=value; values are parsed as JSON when possible
    #[arg(short, long = "extra", value_parser = parse_extra)]
    pub extras: Vec<(String, Value)>,

    /// Per-attempt timeout (e.g. 30s, 2m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

/// Parse a `key=value` extra
fn parse_extra(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid extra '{s}': expected key=value"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid extra '{s}': empty key"));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Execute the invoke command.
pub async fn execute(args: InvokeArgs, json: bool) -> Result<()> {
    let config = ServiceConfig::load(None, &EnvStore).context("Failed to load configuration")?;

    let model = match args.model {
        Some(model) => model,
        None => config
            .ai
            .default_model_for(&args.provider)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No default model for provider '{}', pass --model", args.provider))?,
    };

    let gateway = Gateway::builder()
        .timeout(args.timeout.unwrap_or(config.ai.timeout))
        .build()?;

    let extras: Extras = args.extras.into_iter().collect();
    let request = InvocationRequest::new(args.prompt, &args.provider, &model)
        .with_optional_credential(args.api_key)
        .with_extras(extras);

    info!(provider = %args.provider, model = %model, "Invoking provider");
    let result = gateway.invoke(request).await?;
    info!(attempts = result.attempts, "Invocation succeeded");

    match OutputFormat::from_json_flag(json) {
        OutputFormat::Json => CommandResult::success(result).print(OutputFormat::Json),
        OutputFormat::Text => {
            println!("{}", result.text);
            Ok(())
        }
    }
}
