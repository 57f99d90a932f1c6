//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading service configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::ServiceConfig`]
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// An override value could not be interpreted
    #[error("Invalid value for {key}: {value:?} ({message})")]
    InvalidValue {
        /// Configuration key
        key: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        message: String,
    },
}
