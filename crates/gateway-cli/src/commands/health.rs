//! Health check command.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Args;
use gateway_config::ServiceKind;
use serde::Serialize;

use crate::output::{self, CommandResult, OutputFormat};
use crate::probe::{self, HealthStatus, ServiceTarget};

/// Arguments for the health command.
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Host the services listen on
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port to check (repeatable; default: every known service)
    #[arg(short, long = "port")]
    pub ports: Vec<u16>,

    /// Timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,
}

/// Health check result for output.
#[derive(Debug, Serialize)]
pub struct HealthOutput {
    #[serde(flatten)]
    pub target: ServiceTarget,
    #[serde(flatten)]
    pub health: HealthStatus,
    pub response_time_ms: u64,
}

/// Services to check
fn targets(ports: &[u16]) -> Vec<ServiceTarget> {
    if ports.is_empty() {
        ServiceKind::ALL.into_iter().map(ServiceTarget::known).collect()
    } else {
        ports.iter().copied().map(ServiceTarget::for_port).collect()
    }
}

/// Execute the health command.
pub async fn execute(args: HealthArgs, json: bool) -> Result<()> {
    let format = OutputFormat::from_json_flag(json);
    let client = probe::health_client(Duration::from_secs(args.timeout))?;

    let mut results = Vec::new();
    for target in targets(&args.ports) {
        let start = Instant::now();
        let health = probe::check_health(&client, &args.host, target.port).await;
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        results.push(HealthOutput {
            target,
            health,
            response_time_ms: elapsed,
        });
    }

    if format == OutputFormat::Text {
        output::section("Service health");
        for result in &results {
            output::status(
                &format!(
                    "{} (port {}): {}",
                    result.target.name,
                    result.target.port,
                    result.health.describe()
                ),
                result.health.is_healthy(),
            );
            if let HealthStatus::Healthy { body } = &result.health {
                if let Some(version) = body.get("version").and_then(|v| v.as_str()) {
                    output::key_value("Version", version);
                }
                output::key_value("Response Time", &format!("{}ms", result.response_time_ms));
            }
        }
    }

    let unhealthy = results.iter().filter(|r| !r.health.is_healthy()).count();
    if unhealthy == 0 {
        if format == OutputFormat::Json {
            CommandResult::success(results).print(format)?;
        } else {
            output::success("All services are healthy");
        }
        return Ok(());
    }

    let message = format!("{unhealthy} of {} service(s) unhealthy", results.len());
    CommandResult::failure_with(message.clone(), results).print(format)?;
    bail!(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_targets_cover_known_services() {
        let ports: Vec<u16> = targets(&[]).iter().map(|t| t.port).collect();
        assert_eq!(ports, vec![5102, 5104]);
    }

    #[test]
    fn test_explicit_ports() {
        let targets = targets(&[5104, 8000]);
        assert_eq!(targets[0].name, "Quiz Generator");
        assert_eq!(targets[1].port, 8000);
    }

    #[test]
    fn test_output_serialization() {
        let output = HealthOutput {
            target: ServiceTarget::for_port(5102),
            health: HealthStatus::Unhealthy { code: 500 },
            response_time_ms: 3,
        };

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Material Generator",
                "port": 5102,
                "status": "unhealthy",
                "code": 500,
                "response_time_ms": 3
            })
        );
    }
}
