//! # Gateway Server
//!
//! HTTP front-end services built on the AI gateway.
//!
//! This crate provides:
//! - Quiz generator (`/generate`, `/generate_quiz_and_assignments`)
//! - Study material generator (`/generate_material`)
//! - Shared `/health`, success/error envelopes and request validation
//! - Request-ID and request logging middleware, permissive CORS
//! - Graceful shutdown on Ctrl+C / SIGTERM

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod material;
pub mod middleware;
pub mod quiz;
pub mod response;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod validation;

// Re-export main types
pub use error::ApiError;
pub use response::{success, SuccessResponse};
pub use routes::create_router;
pub use server::{Server, ServerError};
pub use state::{AppState, AppStateBuilder, DEFAULT_API_KEY_VAR};
pub use validation::{validate_non_empty_fields, validate_required_fields};
