//! Credential resolution.
//!
//! An explicit credential from the caller always wins. Otherwise the
//! injected [`ConfigStore`] is consulted under `{PROVIDER}_API_KEY`.

use std::sync::Arc;

use gateway_core::GatewayError;
use secrecy::{ExposeSecret, SecretString};

use crate::store::ConfigStore;

/// Configuration key holding the fallback credential for a provider
#[must_use]
pub fn credential_key(provider: &str) -> String {
    format!("{}_API_KEY", provider.trim().to_uppercase())
}

/// Resolves the effective credential for a provider
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn ConfigStore>,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver").finish_non_exhaustive()
    }
}

impl CredentialResolver {
    /// Create a resolver over the given store
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Resolve the credential for `provider`
    ///
    /// Empty values count as absent on both sources.
    pub fn resolve(
        &self,
        explicit: Option<&SecretString>,
        provider: &str,
    ) -> Result<SecretString, GatewayError> {
        if let Some(secret) = explicit.filter(|s| !s.expose_secret().is_empty()) {
            return Ok(secret.clone());
        }

        let key = credential_key(provider);
        match self.store.get(&key) {
            Some(value) if !value.is_empty() => {
                tracing::debug!(provider, key = %key, "Using configured credential");
                Ok(SecretString::new(value))
            }
            _ => Err(GatewayError::missing_credential(provider, key)),
        }
    }

    /// Whether a credential would resolve without an explicit value
    #[must_use]
    pub fn has_configured(&self, provider: &str) -> bool {
        self.store
            .get(&credential_key(provider))
            .is_some_and(|v| !v.is_empty())
    }
}
