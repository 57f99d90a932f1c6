//! OpenAI chat completions adapter.
//!
//! # API Format
//! `POST https://api.openai.com/v1/chat/completions` with a bearer token,
//! asking for a JSON object response. The generated text is read from
//! `choices[0].message.content`.

use crate::adapter::{merge_extras, text_at, CredentialPlacement, ProviderAdapter};
use gateway_core::{Extras, GatewayError};
use serde_json::{json, Value};

/// Default API base
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Authorization", "Bearer {credential}"),
];

const TEXT_PATH: &str = "choices[0].message.content";

/// Body fields that extras may not replace
const FIXED_FIELDS: &[&str] = &["model", "messages", "response_format"];

/// OpenAI adapter
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    url: String,
    placement: CredentialPlacement,
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiAdapter {
    /// Adapter targeting the public OpenAI API
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(OPENAI_BASE_URL)
    }

    /// Adapter targeting another base URL (proxies, mock servers)
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            placement: CredentialPlacement::Header,
        }
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
    }

    fn url_template(&self) -> &str {
        &self.url
    }

    fn header_templates(&self) -> &[(&'static str, &'static str)] {
        HEADERS
    }

    fn credential_placement(&self) -> &CredentialPlacement {
        &self.placement
    }

    fn build_request_body(&self, prompt: &str, model: &str, extras: &Extras) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("model".into(), json!(model));
        body.insert(
            "messages".into(),
            json!([{ "role": "user", "content": prompt }]),
        );
        body.insert("response_format".into(), json!({ "type": "json_object" }));

        merge_extras(&mut body, extras, FIXED_FIELDS);
        Value::Object(body)
    }

    fn extract_text(&self, response: &Value) -> Result<String, GatewayError> {
        text_at(self.name(), response, TEXT_PATH)
    }
}
