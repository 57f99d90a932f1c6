//! Port, health and log probes shared by `health` and `run-all`.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use gateway_config::ServiceKind;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tracing::debug;

/// Timeout for one `/health` request
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for one port connection attempt
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// A service endpoint to probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceTarget {
    /// Display name
    pub name: String,
    /// Port the service listens on
    pub port: u16,
}

impl ServiceTarget {
    /// Target for a known service on its default port
    pub fn known(kind: ServiceKind) -> Self {
        Self {
            name: display_name(kind).to_string(),
            port: kind.default_port(),
        }
    }

    /// Target for an arbitrary port, named after the known service using it
    pub fn for_port(port: u16) -> Self {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.default_port() == port)
            .map_or_else(
                || Self {
                    name: format!("Service on port {port}"),
                    port,
                },
                Self::known,
            )
    }
}

/// Human-readable service name
pub fn display_name(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Quiz => "Quiz Generator",
        ServiceKind::Material => "Material Generator",
    }
}

/// Outcome of a `/health` request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthStatus {
    /// 2xx response
    Healthy {
        /// Response body (null when not JSON)
        body: Value,
    },
    /// Non-2xx response
    Unhealthy {
        /// HTTP status code
        code: u16,
    },
    /// No response
    Unreachable {
        /// Connection or timeout error
        error: String,
    },
}

impl HealthStatus {
    /// Whether the service answered with 2xx
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// One-line description
    pub fn describe(&self) -> String {
        match self {
            Self::Healthy { .. } => "OK".to_string(),
            Self::Unhealthy { code } => format!("HTTP {code}"),
            Self::Unreachable { error } => format!("check failed: {error}"),
        }
    }
}

/// Whether something accepts TCP connections on `host:port`
pub async fn is_port_in_use(host: &str, port: u16) -> bool {
    matches!(
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Poll a port until it accepts connections
///
/// Returns `false` once `retries` checks have failed.
pub async fn wait_for_port(host: &str, port: u16, retries: u32, delay: Duration) -> bool {
    for attempt in 1..=retries {
        if is_port_in_use(host, port).await {
            debug!(port, attempt, "Port is accepting connections");
            return true;
        }
        tokio::time::sleep(delay).await;
    }
    false
}

/// HTTP client for health checks
pub fn health_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// `GET http://{host}:{port}/health`
pub async fn check_health(client: &reqwest::Client, host: &str, port: u16) -> HealthStatus {
    let url = format!("http://{host}:{port}/health");

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => HealthStatus::Healthy {
            body: resp.json().await.unwrap_or_default(),
        },
        Ok(resp) => HealthStatus::Unhealthy {
            code: resp.status().as_u16(),
        },
        Err(e) => HealthStatus::Unreachable {
            error: e.without_url().to_string(),
        },
    }
}

/// Last `n` lines of a file (empty when it cannot be read)
pub fn tail(path: &Path, n: usize) -> String {
    let Ok(bytes) = std::fs::read(path) else {
        return String::new();
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
