//! The invocation dispatcher.

use gateway_config::{ConfigStore, CredentialResolver, EnvStore};
use gateway_core::{GatewayError, InvocationRequest, InvocationResult};
use gateway_providers::{
    AdapterRegistry, CredentialPlacement, HttpTransport, ProviderAdapter, Transport,
    TransportRequest,
};
use gateway_resilience::RetryPolicy;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Per-attempt timeout used unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider-agnostic entry point for AI calls
///
/// Cheap to clone; clones share the registry, transport and policy.
#[derive(Debug, Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

#[derive(Debug)]
struct GatewayInner {
    registry: AdapterRegistry,
    credentials: CredentialResolver,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Gateway {
    /// Start building a gateway
    #[must_use]
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Gateway with the built-in adapters, environment credentials, default
    /// retry policy and a pooled HTTP client
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::builder().build()
    }

    /// Adapters this gateway dispatches to
    #[must_use]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.inner.registry
    }

    /// Per-attempt timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Run one invocation
    ///
    /// Request errors (empty prompt, unknown provider, missing credential)
    /// are returned before any network call. Transport failures and non-2xx
    /// responses are retried per the policy; the last error is returned
    /// unchanged once attempts run out.
    pub async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResult, GatewayError> {
        if request.prompt.trim().is_empty() {
            return Err(GatewayError::invalid_request("prompt must not be empty"));
        }

        let provider = request.provider_key();
        let adapter = self.inner.registry.get(&provider)?;
        let credential = self
            .inner
            .credentials
            .resolve(request.credential.as_ref(), &provider)?;

        let query = match adapter.credential_placement() {
            CredentialPlacement::QueryParam(name) => {
                vec![(name.clone(), credential.expose_secret().clone())]
            }
            CredentialPlacement::Header => Vec::new(),
        };

        let http_request = TransportRequest {
            url: adapter.render_url(&request.model),
            headers: adapter.render_headers(credential.expose_secret()),
            query,
            body: adapter.build_request_body(&request.prompt, &request.model, &request.extras),
            timeout: self.inner.timeout,
        };

        debug!(provider = %provider, model = %request.model, url = %http_request.url, "Invoking provider");

        let this = self;
        let adapter = adapter.as_ref();
        let http_request = &http_request;
        let outcome = self
            .inner
            .retry
            .run(move |_attempt| this.attempt(adapter, http_request))
            .await;

        let attempts = outcome.attempts();
        let text = outcome.into_result()?;

        Ok(InvocationResult {
            provider,
            model: request.model,
            attempts,
            text,
        })
    }

    /// Run one invocation and return only the text
    pub async fn invoke_text(&self, request: InvocationRequest) -> Result<String, GatewayError> {
        self.invoke(request).await.map(InvocationResult::into_text)
    }

    async fn attempt(
        &self,
        adapter: &dyn ProviderAdapter,
        request: &TransportRequest,
    ) -> Result<String, GatewayError> {
        let provider = adapter.name();

        let response = self
            .inner
            .transport
            .post_json(request.clone())
            .await
            .map_err(|e| GatewayError::provider_call(provider, e.to_string()))?;

        if !response.is_success() {
            return Err(GatewayError::provider_status(
                provider,
                response.status,
                response.body,
            ));
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            GatewayError::extraction(provider, "$", format!("response is not valid JSON: {e}"))
        })?;

        adapter.extract_text(&body)
    }
}

/// Builder for [`Gateway`]
pub struct GatewayBuilder {
    registry: Option<AdapterRegistry>,
    store: Option<Arc<dyn ConfigStore>>,
    retry: Option<RetryPolicy>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self {
            registry: None,
            store: None,
            retry: None,
            transport: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for GatewayBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayBuilder")
            .field("registry", &self.registry)
            .field("custom_store", &self.store.is_some())
            .field("retry", &self.retry)
            .field("transport", &self.transport)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayBuilder {
    /// Use a custom adapter registry (default: built-in adapters)
    #[must_use]
    pub fn registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Configuration store for credential fallback (default: environment)
    #[must_use]
    pub fn config_store<S: ConfigStore + 'static>(self, store: S) -> Self {
        self.shared_config_store(Arc::new(store))
    }

    /// Shared configuration store
    #[must_use]
    pub fn shared_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Retry policy (default: 3 attempts, 4-10 s backoff)
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Transport (default: [`HttpTransport`])
    #[must_use]
    pub fn transport<T: Transport + 'static>(self, transport: T) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Shared transport
    #[must_use]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Per-attempt timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the gateway
    ///
    /// # Errors
    /// Returns a configuration error if the default HTTP client cannot be created
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new().map_err(|e| GatewayError::configuration(e.to_string()))?,
            ),
        };
        let store = self.store.unwrap_or_else(|| Arc::new(EnvStore));

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                registry: self.registry.unwrap_or_else(AdapterRegistry::builtin),
                credentials: CredentialResolver::new(store),
                retry: self.retry.unwrap_or_default(),
                transport,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gateway_config::MapStore;
    use gateway_providers::{TransportError, TransportResponse};
    use gateway_resilience::RetryPolicyBuilder;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    type Reply = Result<TransportResponse, TransportError>;

    /// Replays scripted replies, then repeats `fallback`; records every request.
    #[derive(Debug)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Reply>>,
        fallback: Reply,
        calls: AtomicU32,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Reply>, fallback: Reply) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn always(reply: Reply) -> Arc<Self> {
            Self::new(Vec::new(), reply)
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> TransportRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(&self, request: TransportRequest) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    fn openai_ok(text: &str) -> Reply {
        Ok(TransportResponse::new(
            200,
            json!({"choices": [{"message": {"content": text}}]}).to_string(),
        ))
    }

    fn gemini_ok(text: &str) -> Reply {
        Ok(TransportResponse::new(
            200,
            json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string(),
        ))
    }

    fn unavailable() -> Reply {
        Ok(TransportResponse::new(503, "upstream overloaded"))
    }

    fn gateway(transport: &Arc<ScriptedTransport>, store: MapStore) -> Gateway {
        Gateway::builder()
            .config_store(store)
            .retry_policy(
                RetryPolicyBuilder::new()
                    .multiplier(0.001)
                    .min_delay(Duration::from_millis(1))
                    .max_delay(Duration::from_millis(2))
                    .build(),
            )
            .shared_transport(transport.clone())
            .build()
            .unwrap()
    }

    fn request(provider: &str) -> InvocationRequest {
        InvocationRequest::new("Say hi", provider, "gpt-3.5-turbo").with_credential("sk-test")
    }

    #[tokio::test]
    async fn test_openai_success() {
        let transport = ScriptedTransport::always(openai_ok("{\"greeting\":\"hi\"}"));
        let gw = gateway(&transport, MapStore::new());

        let result = gw.invoke(request("openai")).await.unwrap();

        assert_eq!(result.text, "{\"greeting\":\"hi\"}");
        assert_eq!(result.provider, "openai");
        assert_eq!(result.attempts, 1);
        assert_eq!(transport.calls(), 1);

        let sent = transport.last_request();
        assert_eq!(sent.url, "https://api.openai.com/v1/chat/completions");
        assert!(sent.query.is_empty());
        assert!(sent
            .headers
            .contains(&("Authorization".to_string(), "Bearer sk-test".to_string())));
        assert_eq!(sent.timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_gemini_request_shape() {
        let transport = ScriptedTransport::always(gemini_ok("hello"));
        let gw = gateway(&transport, MapStore::new());

        let text = gw
            .invoke_text(
                InvocationRequest::new("Say hi", "gemini", "gemini-1.5-pro-latest")
                    .with_credential("k"),
            )
            .await
            .unwrap();
        assert_eq!(text, "hello");

        let sent = transport.last_request();
        assert_eq!(
            sent.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro-latest:generateContent"
        );
        assert_eq!(sent.query, vec![("key".to_string(), "k".to_string())]);
        assert_eq!(
            sent.body.to_string(),
            r#"{"contents":[{"parts":[{"text":"Say hi"}]}],"generationConfig":{"response_mime_type":"application/json"}}"#
        );
        assert_eq!(
            sent.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unsupported_provider_makes_no_calls() {
        let transport = ScriptedTransport::always(openai_ok("x"));
        let gw = gateway(&transport, MapStore::new());

        let err = gw.invoke(request("anthropic")).await.unwrap_err();

        assert_eq!(err, GatewayError::unsupported_provider("anthropic"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_calls() {
        let transport = ScriptedTransport::always(openai_ok("x"));
        let gw = gateway(&transport, MapStore::new());

        let err = gw
            .invoke(InvocationRequest::new("Say hi", "openai", "gpt-3.5-turbo"))
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::missing_credential("openai", "OPENAI_API_KEY"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_credential_from_store() {
        let transport = ScriptedTransport::always(gemini_ok("ok"));
        let gw = gateway(&transport, MapStore::new().with("GEMINI_API_KEY", "stored"));

        gw.invoke(InvocationRequest::new("p", "gemini", "gemini-1.5-flash"))
            .await
            .unwrap();

        assert_eq!(
            transport.last_request().query,
            vec![("key".to_string(), "stored".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let transport = ScriptedTransport::always(openai_ok("x"));
        let gw = gateway(&transport, MapStore::new());

        let err = gw
            .invoke(InvocationRequest::new("   ", "openai", "gpt-4o").with_credential("k"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "invalid_request");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let transport = ScriptedTransport::new(
            vec![unavailable(), Err(TransportError::Connect("refused".into()))],
            openai_ok("third time"),
        );
        let gw = gateway(&transport, MapStore::new());

        let result = gw.invoke(request("openai")).await.unwrap();

        assert_eq!(result.text, "third time");
        assert_eq!(result.attempts, 3);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_always_failing_exhausts_attempts() {
        let transport = ScriptedTransport::always(unavailable());
        let gw = gateway(&transport, MapStore::new());

        let err = gw.invoke(request("openai")).await.unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_eq!(
            err,
            GatewayError::provider_status("openai", 503, "upstream overloaded")
        );
        assert!(err.detail().contains("Response: upstream overloaded"));
    }

    #[tokio::test]
    async fn test_connection_errors_exhaust_attempts() {
        let transport = ScriptedTransport::always(Err(TransportError::Connect("refused".into())));
        let gw = gateway(&transport, MapStore::new());

        let err = gw.invoke(request("openai")).await.unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_eq!(err.kind(), "provider_call");
        assert_eq!(err.provider(), Some("openai"));
        assert!(err.detail().contains("refused"));
    }

    #[tokio::test]
    async fn test_missing_path_is_not_retried() {
        let transport = ScriptedTransport::always(Ok(TransportResponse::new(200, "{\"choices\":[]}")));
        let gw = gateway(&transport, MapStore::new());

        let err = gw.invoke(request("openai")).await.unwrap_err();

        assert!(matches!(err, GatewayError::Extraction { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_json_body_is_extraction_error() {
        let transport = ScriptedTransport::always(Ok(TransportResponse::new(200, "<html>")));
        let gw = gateway(&transport, MapStore::new());

        let err = gw.invoke(request("openai")).await.unwrap_err();

        assert_eq!(err.kind(), "extraction");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_name_is_case_insensitive() {
        let transport = ScriptedTransport::always(openai_ok("same"));
        let gw = gateway(&transport, MapStore::new());

        let upper = gw.invoke(request("OpenAI")).await.unwrap();
        let lower = gw.invoke(request("openai")).await.unwrap();

        assert_eq!(upper.provider, "openai");
        assert_eq!(upper.text, lower.text);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_extras_reach_the_body() {
        let transport = ScriptedTransport::always(openai_ok("x"));
        let gw = gateway(&transport, MapStore::new());

        gw.invoke(request("openai").with_extra("temperature", 0.5))
            .await
            .unwrap();

        assert_eq!(transport.last_request().body["temperature"], json!(0.5));
    }

    #[tokio::test]
    async fn test_custom_timeout() {
        let transport = ScriptedTransport::always(openai_ok("x"));
        let gw = Gateway::builder()
            .shared_transport(transport.clone())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        gw.invoke(request("openai")).await.unwrap();
        assert_eq!(transport.last_request().timeout, Duration::from_secs(5));
        assert_eq!(gw.timeout(), Duration::from_secs(5));
    }
}
