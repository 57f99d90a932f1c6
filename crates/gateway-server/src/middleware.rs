//! HTTP middleware: request IDs, request logging, CORS.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::extractors::RequestId;

/// Header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headers never written to logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "api-key"];

/// Assign a request ID (from `X-Request-ID` or a fresh UUID) and echo it back
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log the start and completion of every request
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or_else(|| "N/A".to_string(), |id| id.0.clone());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    info!(request_id = %request_id, method = %method, path = %path, "Request started");
    debug!(
        request_id = %request_id,
        query = request.uri().query().unwrap_or(""),
        headers = ?loggable_headers(request.headers()),
        "Request details"
    );

    let response = next.run(request).await;

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

/// Headers safe to log: credentials are dropped
pub fn loggable_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| !SENSITIVE_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect()
}

/// Allow every origin, method and header
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
