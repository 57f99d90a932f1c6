//! Google Gemini adapter.
//!
//! # API Format
//! `POST https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent?key=...`
//!
//! The API key travels as the `key` query parameter. Extras are merged into
//! `generationConfig` (`temperature`, `maxOutputTokens`, ...).

use crate::adapter::{merge_extras, text_at, CredentialPlacement, ProviderAdapter};
use gateway_core::{Extras, GatewayError};
use serde_json::{json, Value};

/// Default API base (Google AI Studio)
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

const TEXT_PATH: &str = "candidates[0].content.parts[0].text";

const FIXED_GENERATION_FIELDS: &[&str] = &["response_mime_type"];

/// Gemini adapter
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    url_template: String,
    placement: CredentialPlacement,
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiAdapter {
    /// Adapter targeting Google AI Studio
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(GEMINI_BASE_URL)
    }

    /// Adapter targeting another base URL
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            url_template: format!(
                "{}/models/{{model}}:generateContent",
                base_url.trim_end_matches('/')
            ),
            placement: CredentialPlacement::query("key"),
        }
    }
}

impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    fn url_template(&self) -> &str {
        &self.url_template
    }

    fn header_templates(&self) -> &[(&'static str, &'static str)] {
        HEADERS
    }

    fn credential_placement(&self) -> &CredentialPlacement {
        &self.placement
    }

    fn build_request_body(&self, prompt: &str, _model: &str, extras: &Extras) -> Value {
        let mut generation_config = serde_json::Map::new();
        generation_config.insert("response_mime_type".into(), json!("application/json"));
        merge_extras(&mut generation_config, extras, FIXED_GENERATION_FIELDS);

        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        })
    }

    fn extract_text(&self, response: &Value) -> Result<String, GatewayError> {
        text_at(self.name(), response, TEXT_PATH)
    }
}
