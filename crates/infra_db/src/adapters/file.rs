//! JSON-file key-value store
//!
//! All entries live in a single JSON object on disk. Every write rewrites the
//! file through a temporary sibling and a rename, so a crash never leaves a
//! half-written document behind. A malformed file reads as empty; before the
//! first write replaces it, it is moved aside to `<file>.corrupt`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, KeyValueStore, PortError};

/// Store persisted as one JSON document
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates a store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a malformed store file is moved before it is rewritten
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".corrupt");
        PathBuf::from(name)
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, PortError> {
        self.read_entries(false).await
    }

    /// Loads entries that are about to be rewritten
    async fn load_for_update(&self) -> Result<BTreeMap<String, String>, PortError> {
        self.read_entries(true).await
    }

    async fn read_entries(&self, set_aside: bool) -> Result<BTreeMap<String, String>, PortError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(PortError::connection(format!("{}: {}", self.path.display(), e))),
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) if set_aside => {
                let aside = self.corrupt_path();
                tokio::fs::rename(&self.path, &aside)
                    .await
                    .map_err(|e| PortError::connection(format!("{}: {}", self.path.display(), e)))?;
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Store file is malformed, moved aside before rewriting"
                );
                Ok(BTreeMap::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Store file is malformed, reading as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), PortError> {
        let raw = serde_json::to_string_pretty(entries).map_err(PortError::serialization)?;
        let tmp = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::connection(e.to_string()))?;
        }
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| PortError::connection(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PortError::connection(e.to_string()))?;

        debug!(path = %self.path.display(), entries = entries.len(), "Store file written");
        Ok(())
    }
}

impl DomainPort for FileKeyValueStore {}

#[async_trait]
impl HealthCheckable for FileKeyValueStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        match self.load().await {
            Ok(_) => HealthCheckResult::healthy("file-kv-store", start.elapsed().as_millis() as u64),
            Err(e) => HealthCheckResult::unhealthy("file-kv-store", e.to_string()),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PortError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_update().await?;
        entries.insert(key.to_string(), value);
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<bool, PortError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_update().await?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.save(&entries).await?;
        }
        Ok(existed)
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, PortError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .into_keys()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::AdapterHealth;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileKeyValueStore::new(&path);
        store.set("currentUser", "{\"username\":\"jane\"}".to_string()).await.unwrap();
        drop(store);

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(
            reopened.get("currentUser").await.unwrap().as_deref(),
            Some("{\"username\":\"jane\"}")
        );
        assert!(reopened.remove("currentUser").await.unwrap());
        assert_eq!(reopened.get("currentUser").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_and_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested").join("store.json"));

        assert!(store.keys("").await.unwrap().is_empty());
        assert_eq!(store.health_check().await.status, AdapterHealth::Healthy);

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.keys("").await.unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let store = FileKeyValueStore::new(&path);
        assert_eq!(store.get("anything").await.unwrap(), None);
        assert!(!store.corrupt_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_kept_aside_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{\"pendingQuotes\": \"[]\", ").unwrap();

        let store = FileKeyValueStore::new(&path);
        store.set("currentUser", "{}".to_string()).await.unwrap();

        let aside = dir.path().join("store.json.corrupt");
        assert_eq!(store.corrupt_path(), aside);
        assert_eq!(
            std::fs::read_to_string(&aside).unwrap(),
            "{\"pendingQuotes\": \"[]\", "
        );
        assert_eq!(store.keys("").await.unwrap(), vec!["currentUser".to_string()]);
    }
}
