//! # Gateway Config
//!
//! Configuration for the AI gateway and its front-end services:
//! - [`ConfigStore`] abstracts where settings and credentials come from
//! - [`CredentialResolver`] picks the effective API key for a provider
//! - [`ServiceConfig`] holds server, logging and AI defaults for a service

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod store;

pub use config::{AiSettings, LoggingSettings, ServerSettings, ServiceConfig, ServiceKind};
pub use credentials::{credential_key, CredentialResolver};
pub use error::ConfigError;
pub use store::{ConfigStore, EnvStore, MapStore};
