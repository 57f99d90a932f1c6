//! Request and result types for a single AI invocation.
//!
//! An [`InvocationRequest`] carries everything the dispatcher needs to call a
//! provider once; an [`InvocationResult`] carries the extracted text back.

use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Map, Value};

/// Open mapping of provider-specific options merged into the request body
pub type Extras = Map<String, Value>;

/// A logical request to one AI provider
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Prompt text sent to the model
    pub prompt: String,

    /// Provider name (matched case-insensitively)
    pub provider: String,

    /// Model name, chosen by the caller
    pub model: String,

    /// Explicit credential; falls back to configuration when absent
    pub credential: Option<SecretString>,

    /// Provider-specific options
    pub extras: Extras,
}

impl InvocationRequest {
    /// Create a request with no explicit credential and no extras
    pub fn new(
        prompt: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            provider: provider.into(),
            model: model.into(),
            credential: None,
            extras: Extras::new(),
        }
    }

    /// Set the explicit credential
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(SecretString::new(credential.into()));
        self
    }

    /// Set the explicit credential if one is given
    #[must_use]
    pub fn with_optional_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential.map(SecretString::new);
        self
    }

    /// Add a provider-specific option
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Replace all provider-specific options
    #[must_use]
    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    /// Provider name normalised for registry lookups
    #[must_use]
    pub fn provider_key(&self) -> String {
        self.provider.trim().to_lowercase()
    }
}

/// Text extracted from a provider response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    /// Provider that served the request
    pub provider: String,
    /// Model that was requested
    pub model: String,
    /// Number of attempts it took
    pub attempts: u32,
    /// Extracted text, opaque to the gateway
    pub text: String,
}

impl InvocationResult {
    /// Consume the result, keeping only the text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = InvocationRequest::new("Say hi", "Gemini", "gemini-1.5-pro-latest")
            .with_credential("k")
            .with_extra("temperature", 0.2);

        assert_eq!(request.prompt, "Say hi");
        assert_eq!(request.provider_key(), "gemini");
        assert_eq!(request.model, "gemini-1.5-pro-latest");
        assert_eq!(
            request.credential.as_ref().map(|c| c.expose_secret().as_str()),
            Some("k")
        );
        assert_eq!(request.extras.get("temperature"), Some(&json!(0.2)));
    }

    #[test]
    fn test_optional_credential() {
        let request =
            InvocationRequest::new("p", "openai", "gpt-4").with_optional_credential(None);
        assert!(request.credential.is_none());
    }

    #[test]
    fn test_debug_does_not_leak_credential() {
        let request = InvocationRequest::new("p", "openai", "gpt-4").with_credential("sk-secret");
        let debug = format!("{request:?}");
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_result_into_text() {
        let result = InvocationResult {
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            attempts: 1,
            text: "{\"greeting\":\"hi\"}".to_string(),
        };
        assert_eq!(result.into_text(), "{\"greeting\":\"hi\"}");
    }
}
