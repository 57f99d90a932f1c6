//! Key/value configuration sources.

use std::collections::HashMap;

/// Read-only source of configuration values keyed by name
pub trait ConfigStore: Send + Sync {
    /// Look up a value; `None` when the key is not set
    fn get(&self, key: &str) -> Option<String>;
}

/// Store backed by the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvStore;

impl ConfigStore for EnvStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory store, used by tests and embedders
#[derive(Debug, Clone, Default)]
pub struct MapStore {
    values: HashMap<String, String>,
}

impl MapStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Insert a value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigStore for MapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
