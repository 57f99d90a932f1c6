//! End-to-end invocations against mock provider servers.

use gateway_config::MapStore;
use gateway_core::{GatewayError, InvocationRequest};
use gateway_providers::{AdapterRegistry, GeminiAdapter, OpenAiAdapter};
use gateway_resilience::RetryPolicyBuilder;
use gateway_routing::Gateway;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer, store: MapStore) -> Gateway {
    let registry = AdapterRegistry::builder()
        .adapter(OpenAiAdapter::with_base_url(&format!("{}/v1", server.uri())))
        .adapter(GeminiAdapter::with_base_url(&format!("{}/v1beta", server.uri())))
        .build();

    Gateway::builder()
        .registry(registry)
        .config_store(store)
        .retry_policy(
            RetryPolicyBuilder::new()
                .multiplier(0.001)
                .min_delay(Duration::from_millis(1))
                .max_delay(Duration::from_millis(5))
                .build(),
        )
        .timeout(Duration::from_secs(5))
        .build()
        .expect("gateway")
}

#[tokio::test]
async fn test_openai_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-mock"))
        .and(body_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "Say hi"}],
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "MARKER-OPENAI"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, MapStore::new().with("OPENAI_API_KEY", "sk-mock"));
    let text = gateway
        .invoke_text(InvocationRequest::new("Say hi", "OpenAI", "gpt-3.5-turbo"))
        .await
        .unwrap();

    assert_eq!(text, "MARKER-OPENAI");
}

#[tokio::test]
async fn test_gemini_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro-latest:generateContent"))
        .and(query_param("key", "k"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "Say hi"}]}],
            "generationConfig": {"response_mime_type": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "MARKER-GEMINI"}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, MapStore::new());
    let result = gateway
        .invoke(
            InvocationRequest::new("Say hi", "gemini", "gemini-1.5-pro-latest")
                .with_credential("k"),
        )
        .await
        .unwrap();

    assert_eq!(result.text, "MARKER-GEMINI");
    assert_eq!(result.attempts, 1);
}

#[tokio::test]
async fn test_flaky_provider_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "recovered"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, MapStore::new());
    let result = gateway
        .invoke(InvocationRequest::new("p", "openai", "gpt-4o").with_credential("sk"))
        .await
        .unwrap();

    assert_eq!(result.text, "recovered");
    assert_eq!(result.attempts, 3);
}

#[tokio::test]
async fn test_persistent_error_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"bad key\"}"))
        .expect(3)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, MapStore::new());
    let err = gateway
        .invoke(InvocationRequest::new("p", "openai", "gpt-4o").with_credential("wrong"))
        .await
        .unwrap_err();

    match err {
        GatewayError::ProviderCall { provider, status, body, .. } => {
            assert_eq!(provider, "openai");
            assert_eq!(status, Some(401));
            assert_eq!(body.as_deref(), Some("{\"error\":\"bad key\"}"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
