//! API error type rendered as the standard error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::GatewayError;
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use crate::response::timestamp;

/// Error returned by handlers
///
/// Renders as `{success: false, error, service, timestamp, details?}` plus
/// any extra top-level fields.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Human-readable message
    pub message: String,
    /// Structured details
    pub details: Option<Value>,
    /// Service that produced the error
    pub service: Option<&'static str>,
    /// Additional top-level fields
    pub extra: Map<String, Value>,
}

impl ApiError {
    /// Create an error with a status
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            service: None,
            extra: Map::new(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 502 Bad Gateway
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Attach details
    #[must_use]
    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach the service name
    #[must_use]
    pub fn with_service(mut self, service: &'static str) -> Self {
        self.service = Some(service);
        self
    }

    /// Add a top-level field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Map a gateway error to a response, keeping `message` as the headline
    #[must_use]
    pub fn from_gateway(message: impl Into<String>, err: &GatewayError) -> Self {
        let status = match err {
            GatewayError::UnsupportedProvider { .. }
            | GatewayError::MissingCredential { .. }
            | GatewayError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            GatewayError::ProviderCall { .. } | GatewayError::Extraction { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self::new(status, message).with_details(json!({
            "kind": err.kind(),
            "error": err.detail(),
        }))
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self::from_gateway(err.to_string(), &err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.message, "Request failed");
        } else {
            warn!(status = self.status.as_u16(), error = %self.message, "Request rejected");
        }

        let mut body = Map::new();
        body.insert("success".into(), json!(false));
        body.insert("error".into(), json!(self.message));
        body.insert("service".into(), json!(self.service));
        body.insert("timestamp".into(), json!(timestamp()));
        if let Some(details) = self.details {
            body.insert("details".into(), details);
        }
        for (key, value) in self.extra {
            body.entry(key).or_insert(value);
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}
