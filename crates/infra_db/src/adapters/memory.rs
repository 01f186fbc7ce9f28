//! In-memory key-value store

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, KeyValueStore, PortError};

/// Process-local store backed by an ordered map
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with raw entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl DomainPort for InMemoryKeyValueStore {}

#[async_trait]
impl HealthCheckable for InMemoryKeyValueStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-kv-store", 0)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PortError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, PortError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, PortError> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use core_kernel::{read_json, write_json, ScopedStore};

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("a", "1".to_string()).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));

        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_json_reads_as_absent() {
        let store = InMemoryKeyValueStore::with_entries([("pendingQuotes", "{not json")]);
        let decoded: Option<Vec<String>> = read_json(&store, "pendingQuotes").await.unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn test_scoped_store_namespaces_keys() {
        let shared: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
        let alice = ScopedStore::new(shared.clone(), "alice");
        let bob = ScopedStore::new(shared.clone(), "bob");

        write_json(&alice, "currentUser", &"alice").await.unwrap();
        assert_eq!(bob.get("currentUser").await.unwrap(), None);
        assert_eq!(shared.get("alice/currentUser").await.unwrap(), Some("\"alice\"".to_string()));
        assert_eq!(alice.keys("current").await.unwrap(), vec!["currentUser".to_string()]);
    }
}
