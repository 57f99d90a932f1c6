//! Adapter registry.
//!
//! Maps lower-cased provider names to adapters. A registry is immutable once
//! built; the built-in one is created on first use and shared for the life
//! of the process.

use crate::adapter::ProviderAdapter;
use crate::gemini::GeminiAdapter;
use crate::openai::OpenAiAdapter;
use gateway_core::GatewayError;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Arc;

static BUILTIN: Lazy<AdapterRegistry> = Lazy::new(|| {
    AdapterRegistry::builder()
        .adapter(OpenAiAdapter::new())
        .adapter(GeminiAdapter::new())
        .build()
});

/// Read-only mapping from provider name to adapter
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    adapters: Arc<BTreeMap<String, Arc<dyn ProviderAdapter>>>,
}

impl AdapterRegistry {
    /// Registry with the built-in adapters (openai, gemini)
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Start building a custom registry
    #[must_use]
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    /// Look up an adapter, ignoring case
    pub fn get(&self, name: &str) -> Result<Arc<dyn ProviderAdapter>, GatewayError> {
        let key = name.trim().to_lowercase();
        self.adapters
            .get(&key)
            .cloned()
            .ok_or_else(|| GatewayError::unsupported_provider(key))
    }

    /// Check if a provider is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(&name.trim().to_lowercase())
    }

    /// Registered provider names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Number of registered adapters
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Builder for [`AdapterRegistry`]
#[derive(Debug, Default)]
pub struct AdapterRegistryBuilder {
    adapters: BTreeMap<String, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistryBuilder {
    /// Register an adapter; a later adapter with the same name replaces the earlier one
    #[must_use]
    pub fn adapter<A: ProviderAdapter + 'static>(self, adapter: A) -> Self {
        self.shared_adapter(Arc::new(adapter))
    }

    /// Register an already shared adapter
    #[must_use]
    pub fn shared_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.name().to_lowercase(), adapter);
        self
    }

    /// Freeze the registry
    #[must_use]
    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry {
            adapters: Arc::new(self.adapters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_adapters() {
        let registry = AdapterRegistry::builtin();

        assert_eq!(registry.names(), vec!["gemini", "openai"]);
        assert!(registry.contains("openai"));
        assert!(registry.contains("Gemini"));
        assert!(!registry.contains("anthropic"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = AdapterRegistry::builtin();

        let lower = registry.get("openai").unwrap();
        let mixed = registry.get("OpenAI").unwrap();
        assert!(Arc::ptr_eq(&lower, &mixed));
    }

    #[test]
    fn test_unknown_provider() {
        let registry = AdapterRegistry::builtin();

        let err = registry.get("Anthropic").unwrap_err();
        assert_eq!(err, GatewayError::unsupported_provider("anthropic"));
        assert_eq!(err.to_string(), "Unsupported AI provider: anthropic");
    }

    #[test]
    fn test_custom_registry() {
        let registry = AdapterRegistry::builder()
            .adapter(OpenAiAdapter::with_base_url("http://localhost:1234/v1"))
            .build();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("openai").unwrap().url_template(),
            "http://localhost:1234/v1/chat/completions"
        );
        assert!(registry.get("gemini").is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = AdapterRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
