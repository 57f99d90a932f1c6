//! # Gateway Routing
//!
//! Dispatches one logical AI invocation:
//! - Adapter lookup by provider name
//! - Credential resolution (explicit value, then `{PROVIDER}_API_KEY`)
//! - Request rendering from the adapter's templates
//! - HTTP POST under the retry policy
//! - Text extraction from the provider's response

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gateway;

// Re-export main types
pub use gateway::{Gateway, GatewayBuilder, DEFAULT_TIMEOUT};
