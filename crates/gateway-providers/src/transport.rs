//! HTTP transport used by the dispatcher.
//!
//! [`Transport`] performs one JSON POST and reports what came back. Status
//! codes are not interpreted here; the dispatcher decides what a non-2xx
//! response means.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// One outgoing request
#[derive(Clone)]
pub struct TransportRequest {
    /// Fully rendered URL, without query parameters
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Value,
    /// Per-attempt timeout
    pub timeout: Duration,
}

// Header and query values may hold credentials.
impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        let query_names: Vec<&str> = self.query.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("TransportRequest")
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("query", &query_names)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Raw response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before a complete response was received
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No response within the per-attempt timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other request failure
    #[error("request failed: {0}")]
    Request(String),

    /// Response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Performs JSON POST requests
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send one request; exactly one network exchange per call
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] over a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a pooled client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let timeout = request.timeout;
        let mut builder = self.client.post(&request.url).timeout(timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        // The URL may carry a credential in its query string; keep it out of errors.
        let response = builder.json(&request.body).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else if e.is_connect() {
                TransportError::Connect(e.without_url().to_string())
            } else {
                TransportError::Request(e.without_url().to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Body(e.without_url().to_string())
            }
        })?;

        trace!(status, body_len = body.len(), "Received provider response");

        Ok(TransportResponse { status, body })
    }
}
