//! Logging initialization.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the file writer flushing for the life of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Service name recorded in the startup event
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines
    pub json: bool,
    /// Include the event target
    pub with_target: bool,
    /// File that receives a copy of every event
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "ai-gateway".to_string(),
            level: "info".to_string(),
            json: false,
            with_target: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Create a configuration for a service
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the fallback level
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Switch JSON output on or off
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Show or hide event targets
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Also append events to a file (console output is kept)
    #[must_use]
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Filter from `RUST_LOG`, or from the configured level
    ///
    /// # Errors
    /// Returns error if `RUST_LOG` is unset and the configured level is not a valid directive
    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| LoggingError::InvalidLevel(format!("{}: {e}", self.level))),
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns error if the level is invalid or a subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(config.with_target).boxed()
    };

    let file_layer = match &config.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let _ = FILE_GUARD.set(guard);

            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(config.with_target)
                .with_writer(writer);
            Some(if config.json {
                layer.json().with_current_span(true).boxed()
            } else {
                layer.boxed()
            })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(
        service = %config.service_name,
        json = config.json,
        file = ?config.file,
        "Logging initialized"
    );

    Ok(())
}

/// Open a log file for appending, creating missing parent directories
///
/// # Errors
/// Returns error if the directory or the file cannot be created
pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let file_error = |source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(file_error)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(file_error)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level directive could not be parsed
    #[error("Invalid log level {0}")]
    InvalidLevel(String),
    /// A global subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
    /// The log file could not be opened
    #[error("Failed to open log file {}: {source}", path.display())]
    File {
        /// Log file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
