//! Provider adapter trait.
//!
//! Everything that differs between providers lives behind [`ProviderAdapter`];
//! the dispatcher never branches on a provider name.

use gateway_core::{Extras, GatewayError};
use serde_json::Value;
use std::fmt;

/// Placeholder in URL templates replaced by the model name
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Placeholder in header templates replaced by the credential
pub const CREDENTIAL_PLACEHOLDER: &str = "{credential}";

/// Where the credential is attached to the outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPlacement {
    /// Only through header templates containing [`CREDENTIAL_PLACEHOLDER`]
    Header,
    /// As a query parameter with the given name
    QueryParam(String),
}

impl CredentialPlacement {
    /// Query parameter placement
    pub fn query(name: impl Into<String>) -> Self {
        Self::QueryParam(name.into())
    }
}

/// Static description of one provider's HTTP API
///
/// Implementations must be stateless after construction: `build_request_body`
/// and `extract_text` are pure functions of their inputs.
pub trait ProviderAdapter: Send + Sync + fmt::Debug {
    /// Lower-case provider name used for lookup
    fn name(&self) -> &str;

    /// Endpoint URL, optionally containing [`MODEL_PLACEHOLDER`]
    fn url_template(&self) -> &str;

    /// Ordered `(header name, template)` pairs
    fn header_templates(&self) -> &[(&'static str, &'static str)];

    /// Where the credential goes
    fn credential_placement(&self) -> &CredentialPlacement;

    /// Build the JSON request body
    fn build_request_body(&self, prompt: &str, model: &str, extras: &Extras) -> Value;

    /// Pull the generated text out of a parsed response body
    fn extract_text(&self, response: &Value) -> Result<String, GatewayError>;

    /// Endpoint URL for a model
    fn render_url(&self, model: &str) -> String {
        let template = self.url_template();
        if template.contains(MODEL_PLACEHOLDER) {
            template.replace(MODEL_PLACEHOLDER, model)
        } else {
            template.to_string()
        }
    }

    /// Headers with the credential substituted where a template asks for it
    fn render_headers(&self, credential: &str) -> Vec<(String, String)> {
        self.header_templates()
            .iter()
            .map(|(name, template)| {
                let value = if template.contains(CREDENTIAL_PLACEHOLDER) {
                    template.replace(CREDENTIAL_PLACEHOLDER, credential)
                } else {
                    (*template).to_string()
                };
                ((*name).to_string(), value)
            })
            .collect()
    }
}

/// Walk a dotted path such as `choices[0].message.content` and return the
/// string found there.
pub(crate) fn text_at(provider: &str, response: &Value, path: &str) -> Result<String, GatewayError> {
    let mut current = response;

    for segment in path.split('.') {
        let (key, indexes) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };

        if !key.is_empty() {
            current = current
                .get(key)
                .ok_or_else(|| missing(provider, path, key))?;
        }

        for index in indexes
            .split(['[', ']'])
            .filter(|s| !s.is_empty())
        {
            let i: usize = index
                .parse()
                .map_err(|_| GatewayError::extraction(provider, path, format!("bad index {index}")))?;
            current = current
                .get(i)
                .ok_or_else(|| missing(provider, path, &format!("{key}[{i}]")))?;
        }
    }

    current.as_str().map(str::to_string).ok_or_else(|| {
        GatewayError::extraction(
            provider,
            path,
            format!("expected a string, found {}", json_type(current)),
        )
    })
}

fn missing(provider: &str, path: &str, segment: &str) -> GatewayError {
    GatewayError::extraction(provider, path, format!("missing `{segment}` in response"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Copy caller extras into `target`, leaving keys in `fixed` untouched.
pub(crate) fn merge_extras(target: &mut serde_json::Map<String, Value>, extras: &Extras, fixed: &[&str]) {
    for (key, value) in extras {
        if fixed.contains(&key.as_str()) {
            tracing::debug!(key = %key, "Ignoring extra that would override a fixed field");
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Fixture {
        placement: CredentialPlacement,
    }

    impl ProviderAdapter for Fixture {
        fn name(&self) -> &str {
            "fixture"
        }

        fn url_template(&self) -> &str {
            "https://example.test/{model}/run"
        }

        fn header_templates(&self) -> &[(&'static str, &'static str)] {
            &[("X-Key", "Token {credential}"), ("Accept", "application/json")]
        }

        fn credential_placement(&self) -> &CredentialPlacement {
            &self.placement
        }

        fn build_request_body(&self, prompt: &str, _model: &str, _extras: &Extras) -> Value {
            json!({ "prompt": prompt })
        }

        fn extract_text(&self, response: &Value) -> Result<String, GatewayError> {
            text_at(self.name(), response, "out")
        }
    }

    #[test]
    fn test_render_url_and_headers() {
        let adapter = Fixture {
            placement: CredentialPlacement::Header,
        };

        assert_eq!(adapter.render_url("m-1"), "https://example.test/m-1/run");
        assert_eq!(
            adapter.render_headers("abc"),
            vec![
                ("X-Key".to_string(), "Token abc".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_at_nested_path() {
        let body = json!({"a": [{"b": {"c": "hello"}}]});
        assert_eq!(text_at("p", &body, "a[0].b.c").unwrap(), "hello");
    }

    #[test]
    fn test_text_at_missing_segment() {
        let body = json!({"a": []});
        let err = text_at("p", &body, "a[0].b").unwrap_err();

        match err {
            GatewayError::Extraction { provider, path, message } => {
                assert_eq!(provider, "p");
                assert_eq!(path, "a[0].b");
                assert!(message.contains("a[0]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_text_at_non_string() {
        let body = json!({"a": {"b": 3}});
        let err = text_at("p", &body, "a.b").unwrap_err();
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_merge_extras_keeps_fixed_fields() {
        let mut target = json!({"model": "m"}).as_object().cloned().unwrap();
        let mut extras = Extras::new();
        extras.insert("model".into(), json!("other"));
        extras.insert("temperature".into(), json!(0.2));

        merge_extras(&mut target, &extras, &["model"]);
        assert_eq!(Value::Object(target), json!({"model": "m", "temperature": 0.2}));
    }
}
