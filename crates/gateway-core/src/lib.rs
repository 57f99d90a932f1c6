//! # Gateway Core
//!
//! Core types and error handling for the AI gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - The invocation request and result types
//! - The error taxonomy shared by adapters, the dispatcher and front-ends

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;

// Re-export commonly used types
pub use error::{GatewayError, GatewayResult};
pub use request::{Extras, InvocationRequest, InvocationResult};
