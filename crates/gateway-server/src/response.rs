//! Success envelope shared by the front-end services.

use axum::Json;
use serde::Serialize;

/// `{success: true, data, service, timestamp}`
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    /// Always `true`
    pub success: bool,
    /// Payload
    pub data: T,
    /// Service name
    pub service: &'static str,
    /// UTC timestamp, RFC 3339
    pub timestamp: String,
}

impl<T: Serialize> SuccessResponse<T> {
    /// Wrap a payload
    pub fn new(service: &'static str, data: T) -> Self {
        Self {
            success: true,
            data,
            service,
            timestamp: timestamp(),
        }
    }
}

/// Wrap a payload in the success envelope
pub fn success<T: Serialize>(service: &'static str, data: T) -> Json<SuccessResponse<T>> {
    Json(SuccessResponse::new(service, data))
}

/// Current UTC time for envelopes
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
