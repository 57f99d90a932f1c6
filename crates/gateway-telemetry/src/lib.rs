//! # Gateway Telemetry
//!
//! Logging setup shared by the gateway binaries: an `EnvFilter` driven by
//! `RUST_LOG` (falling back to a configured level) and either a
//! human-readable or a JSON formatter, optionally copied to a log file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, open_log_file, LoggingConfig, LoggingError};
