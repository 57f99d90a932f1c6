//! Run-all command - launches every service and verifies it comes up.
//!
//! Services already listening on their port are left alone. The others are
//! spawned as detached `serve` processes whose output is appended to
//! `<log-dir>/<service>.log`, so they keep running after this command exits.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use gateway_config::ServiceKind;
use serde::Serialize;
use tracing::{debug, warn};

use crate::output::{self, CommandResult, OutputFormat};
use crate::probe::{self, HealthStatus, ServiceTarget, HEALTH_TIMEOUT};

/// Arguments for the run-all command.
#[derive(Args, Debug)]
pub struct RunAllArgs {
    /// Directory for service logs
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Host used for port and health checks
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port checks before a service is considered failed
    #[arg(long, default_value = "30")]
    pub retries: u32,

    /// Delay between port checks
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub delay: Duration,

    /// Log lines shown for a failed service
    #[arg(long, default_value = "40")]
    pub tail_lines: usize,
}

/// What happened to one service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Launch {
    /// Port was already in use
    AlreadyRunning,
    /// A new process was spawned
    Started {
        /// Child process ID
        pid: u32,
    },
}

/// Per-service report for output.
#[derive(Debug, Serialize)]
pub struct ServiceReport {
    #[serde(flatten)]
    pub target: ServiceTarget,
    pub launch: Launch,
    pub log: PathBuf,
    /// Whether the port came up and `/health` answered
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthStatus>,
}

/// Log file for a service
fn log_path(log_dir: &Path, kind: ServiceKind) -> PathBuf {
    log_dir.join(format!("{}.log", kind.service_name()))
}

/// Spawn `<exe> serve <service>` with output appended to `log`
fn start_service(exe: &Path, kind: ServiceKind, log: &Path) -> Result<u32> {
    if let Some(dir) = log.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    let mut logfile = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
        .with_context(|| format!("Failed to open log file {}", log.display()))?;

    let port = kind.default_port();
    writeln!(
        logfile,
        "\n==== Starting {} ====: {} serve {kind} on port {port}",
        probe::display_name(kind),
        exe.display(),
    )?;
    logfile.flush()?;

    let stderr = logfile.try_clone()?;
    let child = Command::new(exe)
        .arg("serve")
        .arg(kind.to_string())
        .arg("--port")
        .arg(port.to_string())
        // Output already lands in `log`
        .env_remove("GATEWAY_LOG_DIR")
        .stdin(Stdio::null())
        .stdout(Stdio::from(logfile))
        .stderr(Stdio::from(stderr))
        .spawn()
        .with_context(|| format!("Failed to spawn {}", probe::display_name(kind)))?;

    debug!(service = %kind, pid = child.id(), "Service process spawned");
    Ok(child.id())
}

/// Execute the run-all command.
pub async fn execute(args: RunAllArgs, json: bool) -> Result<()> {
    let format = OutputFormat::from_json_flag(json);
    let text = format == OutputFormat::Text;
    let exe = std::env::current_exe().context("Failed to locate the current executable")?;

    let mut reports = Vec::new();
    for kind in ServiceKind::ALL {
        let target = ServiceTarget::known(kind);
        let log = log_path(&args.log_dir, kind);

        let launch = if probe::is_port_in_use(&args.host, target.port).await {
            if text {
                output::info(&format!("{} already running on port {}.", target.name, target.port));
            }
            Launch::AlreadyRunning
        } else {
            let pid = start_service(&exe, kind, &log)?;
            if text {
                output::success(&format!("Started {} (port {})", target.name, target.port));
            }
            Launch::Started { pid }
        };

        reports.push(ServiceReport {
            target,
            launch,
            log,
            ok: false,
            health: None,
        });
    }

    if text {
        output::info("Waiting for all services to be up...");
    }
    let client = probe::health_client(HEALTH_TIMEOUT)?;

    for report in &mut reports {
        let ServiceTarget { name, port } = &report.target;

        if !probe::wait_for_port(&args.host, *port, args.retries, args.delay).await {
            warn!(service = %name, port, "Service did not open its port");
            if text {
                output::error(&format!("Failed to start {name} on port {port}"));
                show_log(&report.log, args.tail_lines);
            }
            continue;
        }

        let health = probe::check_health(&client, &args.host, *port).await;
        match &health {
            HealthStatus::Healthy { .. } => {
                report.ok = true;
                if text {
                    output::success(&format!("{name} health: OK"));
                }
            }
            // The port is up, so a non-2xx answer is reported but not fatal
            HealthStatus::Unhealthy { code } => {
                report.ok = true;
                if text {
                    output::warning(&format!("{name} health: HTTP {code}"));
                }
            }
            HealthStatus::Unreachable { error } => {
                if text {
                    output::error(&format!("{name} health check failed: {error}"));
                    show_log(&report.log, args.tail_lines);
                }
            }
        }
        report.health = Some(health);
    }

    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| !r.ok)
        .map(|r| r.target.name.as_str())
        .collect();

    if failed.is_empty() {
        if text {
            output::success("All services are running and responded to health checks.");
        } else {
            CommandResult::success(&reports).print(format)?;
        }
        return Ok(());
    }

    let message = format!("One or more services failed: {}", failed.join(", "));
    if text {
        output::error("One or more services failed. See logs above.");
    } else {
        CommandResult::failure_with(message.clone(), &reports).print(format)?;
    }
    bail!(message)
}

fn show_log(log: &Path, lines: usize) {
    output::section(&format!("Recent log output ({})", log.display()));
    output::log_excerpt(&probe::tail(log, lines));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path() {
        assert_eq!(
            log_path(Path::new("logs"), ServiceKind::Quiz),
            PathBuf::from("logs/quiz_generator.log")
        );
        assert_eq!(
            log_path(Path::new("/var/log/ai"), ServiceKind::Material),
            PathBuf::from("/var/log/ai/material_generator.log")
        );
    }

    #[test]
    fn test_start_service_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_path(&dir.path().join("logs"), ServiceKind::Quiz);

        // `true` exits immediately; only the spawn and the header matter here
        let pid = start_service(Path::new("true"), ServiceKind::Quiz, &log).unwrap();
        assert!(pid > 0);

        let contents = fs::read_to_string(&log).unwrap();
        assert!(contents.contains("==== Starting Quiz Generator ====: true serve quiz on port 5104"));
    }

    #[test]
    fn test_start_service_reports_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_path(dir.path(), ServiceKind::Material);

        let err = start_service(Path::new("/nonexistent/ai-gateway-cli"), ServiceKind::Material, &log)
            .unwrap_err();
        assert!(err.to_string().contains("Material Generator"));
    }

    #[test]
    fn test_report_serialization() {
        let report = ServiceReport {
            target: ServiceTarget::known(ServiceKind::Quiz),
            launch: Launch::AlreadyRunning,
            log: PathBuf::from("logs/quiz_generator.log"),
            ok: true,
            health: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["name"], "Quiz Generator");
        assert_eq!(value["launch"], "already_running");
        assert_eq!(value["ok"], true);
        assert!(value.get("health").is_none());
    }
}
