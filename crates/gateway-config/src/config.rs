//! Service configuration.
//!
//! Settings are read from an optional TOML file, then overridden from a
//! [`ConfigStore`] (normally the environment) using `GATEWAY_*` keys.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::store::ConfigStore;

/// Front-end service to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Quiz generator
    #[default]
    Quiz,
    /// Study material generator
    Material,
}

impl ServiceKind {
    /// All known services, in launch order
    pub const ALL: [Self; 2] = [Self::Material, Self::Quiz];

    /// Service name used in logs and response envelopes
    #[must_use]
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Quiz => "quiz_generator",
            Self::Material => "material_generator",
        }
    }

    /// Port the service listens on unless configured otherwise
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Quiz => 5104,
            Self::Material => 5102,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiz => write!(f, "quiz"),
            Self::Material => write!(f, "material"),
        }
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiz" | "quiz_generator" => Ok(Self::Quiz),
            "material" | "material_generator" => Ok(Self::Material),
            other => Err(format!("unknown service: {other}")),
        }
    }
}

/// Top-level configuration for one service process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Which service to run
    pub service: ServiceKind,
    /// Listener settings
    pub server: ServerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// AI invocation defaults
    pub ai: AiSettings,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Bind port; the service's default port when unset
    pub port: Option<u16>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Also append logs to `<dir>/<service>.log`
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

/// AI invocation defaults used by the front-ends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Provider used when a request does not name one
    pub default_provider: String,
    /// Per-attempt timeout for provider calls
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Model used for OpenAI requests that do not name one
    pub openai_model: String,
    /// Model used for Gemini requests that do not name one
    pub gemini_model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            timeout: Duration::from_secs(60),
            openai_model: "gpt-3.5-turbo".to_string(),
            gemini_model: "gemini-1.5-pro-latest".to_string(),
        }
    }
}

impl AiSettings {
    /// Default model for a provider, if the front-ends know one
    #[must_use]
    pub fn default_model_for(&self, provider: &str) -> Option<&str> {
        match provider.trim().to_lowercase().as_str() {
            "openai" => Some(self.openai_model.as_str()),
            "gemini" => Some(self.gemini_model.as_str()),
            _ => None,
        }
    }
}

impl ServiceConfig {
    /// Default configuration for a given service
    #[must_use]
    pub fn for_service(service: ServiceKind) -> Self {
        Self {
            service,
            ..Self::default()
        }
    }

    /// Load configuration
    ///
    /// Uses `path` if given, otherwise the file named by `GATEWAY_CONFIG` in
    /// the store, otherwise defaults. Store overrides are applied last.
    pub fn load(path: Option<&Path>, store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| store.get("GATEWAY_CONFIG").map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let config = Self::load_from_path(&path)?;
                info!(path = ?path, "Configuration file loaded");
                config
            }
            None => Self::default(),
        };

        config.apply_overrides(store)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `GATEWAY_*` overrides from the store
    pub fn apply_overrides(&mut self, store: &dyn ConfigStore) -> Result<(), ConfigError> {
        if let Some(value) = store.get("GATEWAY_SERVICE") {
            self.service = value
                .parse()
                .map_err(|message| invalid("GATEWAY_SERVICE", &value, message))?;
        }
        if let Some(value) = store.get("GATEWAY_HOST") {
            self.server.host = value;
        }
        if let Some(value) = store.get("GATEWAY_PORT") {
            let port = value
                .parse::<u16>()
                .map_err(|e| invalid("GATEWAY_PORT", &value, e.to_string()))?;
            self.server.port = Some(port);
        }
        if let Some(value) = store.get("GATEWAY_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = store.get("GATEWAY_LOG_JSON") {
            self.logging.json = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(value) = store.get("GATEWAY_LOG_DIR") {
            self.logging.dir = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        if let Some(value) = store.get("GATEWAY_AI_PROVIDER") {
            self.ai.default_provider = value.to_lowercase();
        }
        if let Some(value) = store.get("GATEWAY_AI_TIMEOUT") {
            self.ai.timeout = humantime::parse_duration(&value)
                .map_err(|e| invalid("GATEWAY_AI_TIMEOUT", &value, e.to_string()))?;
        }
        Ok(())
    }

    /// Log file for this service, when a log directory is configured
    #[must_use]
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging
            .dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.log", self.service.service_name())))
    }

    /// Port to bind, falling back to the service's default
    #[must_use]
    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or_else(|| self.service.default_port())
    }
}

fn invalid(key: &str, value: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}
