//! Error types for the AI gateway.
//!
//! Every failure an invocation can produce maps onto one [`GatewayError`]
//! variant. Only [`GatewayError::ProviderCall`] is transient; the rest are
//! surfaced to the caller on first occurrence.

use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while invoking an AI provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No adapter is registered for the requested provider
    #[error("Unsupported AI provider: {provider}")]
    UnsupportedProvider {
        /// Provider name as requested (lower-cased)
        provider: String,
    },

    /// No credential could be resolved for the provider
    #[error("No API key provided for {provider} and {key} is not set")]
    MissingCredential {
        /// Provider name
        provider: String,
        /// Configuration key that was consulted
        key: String,
    },

    /// Transport or HTTP-level failure talking to the provider
    #[error("Error calling {provider} API: {message}")]
    ProviderCall {
        /// Provider name
        provider: String,
        /// Underlying error message
        message: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Raw response body, when one was received
        body: Option<String>,
    },

    /// The provider answered successfully but the envelope had an unexpected shape
    #[error("Unexpected {provider} response: {message} (path {path})")]
    Extraction {
        /// Provider name
        provider: String,
        /// Path the adapter expected to find
        path: String,
        /// What went wrong while navigating the envelope
        message: String,
    },

    /// The caller supplied an unusable request
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// Gateway misconfiguration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl GatewayError {
    /// Create an unsupported provider error
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(provider: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            key: key.into(),
        }
    }

    /// Create a provider call error without response details (transport failure)
    pub fn provider_call(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderCall {
            provider: provider.into(),
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Create a provider call error from a non-success HTTP response
    pub fn provider_status(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::ProviderCall {
            provider: provider.into(),
            message: format!("HTTP status {status}"),
            status: Some(status),
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    /// Create an extraction error
    pub fn extraction(
        provider: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            provider: provider.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the failure may go away on a later attempt
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderCall { .. })
    }

    /// Provider the error relates to, if any
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::UnsupportedProvider { provider }
            | Self::MissingCredential { provider, .. }
            | Self::ProviderCall { provider, .. }
            | Self::Extraction { provider, .. } => Some(provider),
            Self::InvalidRequest { .. } | Self::Configuration { .. } => None,
        }
    }

    /// Stable snake_case code for API error payloads
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedProvider { .. } => "unsupported_provider",
            Self::MissingCredential { .. } => "missing_credential",
            Self::ProviderCall { .. } => "provider_call",
            Self::Extraction { .. } => "extraction",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// Full diagnostic text, including the raw response body when present
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::ProviderCall {
                body: Some(body), ..
            } => format!("{self}\nResponse: {body}"),
            _ => self.to_string(),
        }
    }
}
