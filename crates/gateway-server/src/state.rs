//! Shared application state.

use gateway_config::{ConfigStore, EnvStore, ServiceConfig};
use gateway_core::GatewayError;
use gateway_routing::Gateway;
use std::sync::Arc;

/// Store key for the credential front-ends use when a request carries none
pub const DEFAULT_API_KEY_VAR: &str = "DEFAULT_AI_API_KEY";

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<ServiceConfig>,
    /// AI gateway
    pub gateway: Gateway,
    /// Configuration store consulted for default credentials
    pub store: Arc<dyn ConfigStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a builder
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Service name used in envelopes and logs
    #[must_use]
    pub fn service_name(&self) -> &'static str {
        self.config.service.service_name()
    }

    /// Explicit credential for a request: the body's `api_key`, else `DEFAULT_AI_API_KEY`
    #[must_use]
    pub fn request_credential(&self, api_key: Option<&str>) -> Option<String> {
        api_key
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.store.get(DEFAULT_API_KEY_VAR).filter(|k| !k.is_empty()))
    }

    /// Whether a call to `provider` would find a credential
    #[must_use]
    pub fn has_credential(&self, api_key: Option<&str>, provider: &str) -> bool {
        self.request_credential(api_key).is_some()
            || self
                .store
                .get(&gateway_config::credential_key(provider))
                .is_some_and(|k| !k.is_empty())
    }

    /// Provider for a request, falling back to the configured default
    #[must_use]
    pub fn provider_for(&self, requested: Option<&str>) -> String {
        requested
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(self.config.ai.default_provider.as_str())
            .trim()
            .to_lowercase()
    }

    /// Model for a request, falling back to the configured default for the provider
    #[must_use]
    pub fn model_for(&self, requested: Option<&str>, provider: &str) -> String {
        requested
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.config.ai.default_model_for(provider))
            .unwrap_or_default()
            .to_string()
    }
}

/// Builder for [`AppState`]
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ServiceConfig>,
    gateway: Option<Gateway>,
    store: Option<Arc<dyn ConfigStore>>,
}

impl AppStateBuilder {
    /// Set the configuration
    #[must_use]
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the gateway
    #[must_use]
    pub fn gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the configuration store (default: environment)
    #[must_use]
    pub fn config_store<S: ConfigStore + 'static>(self, store: S) -> Self {
        self.shared_config_store(Arc::new(store))
    }

    /// Set a shared configuration store
    #[must_use]
    pub fn shared_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the state
    ///
    /// Without an explicit gateway, one is built over the same store with the
    /// configured timeout.
    ///
    /// # Errors
    /// Returns error if the default gateway cannot be created
    pub fn build(self) -> Result<AppState, GatewayError> {
        let config = self.config.unwrap_or_default();
        let store = self.store.unwrap_or_else(|| Arc::new(EnvStore));

        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => Gateway::builder()
                .shared_config_store(store.clone())
                .timeout(config.ai.timeout)
                .build()?,
        };

        Ok(AppState {
            config: Arc::new(config),
            gateway,
            store,
        })
    }
}
