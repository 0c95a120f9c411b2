//! Embedded key-value store.
//!
//! A store is a single JSON document `<dir>/<name>.json` holding a schema
//! version and a map of records. Every write replaces the document
//! atomically under an exclusive lock; the in-memory copy is only updated
//! once the write succeeded, so a failed `put` leaves the store unchanged.
//!
//! Opening with a higher schema version than the one on disk runs the
//! caller's upgrade hook first. Opening with a lower one is refused.
//! A document that cannot be parsed is treated as a new, empty store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::atomic_file::{FileLock, write_atomic};
use scribe_core::{Result, ScribeError};

type Records = BTreeMap<String, Value>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    name: String,
    version: u32,
    #[serde(default)]
    records: Records,
}

/// Mutable view of the records handed to the upgrade hook.
pub struct Upgrade<'a> {
    old_version: u32,
    new_version: u32,
    records: &'a mut Records,
}

impl Upgrade<'_> {
    /// Version found on disk; 0 for a store that did not exist.
    pub fn old_version(&self) -> u32 {
        self.old_version
    }

    pub fn new_version(&self) -> u32 {
        self.new_version
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Handle to an open store.
#[derive(Clone)]
pub struct KvStore {
    name: String,
    version: u32,
    path: PathBuf,
    records: Arc<Mutex<Records>>,
}

impl KvStore {
    /// Opens the store `name` in `dir`, creating it if missing.
    ///
    /// `upgrade` runs only when the stored version is older than `version`
    /// (a new store counts as version 0).
    pub async fn open_or_create<F>(dir: &Path, name: &str, version: u32, upgrade: F) -> Result<Self>
    where
        F: FnOnce(&mut Upgrade<'_>) -> Result<()> + Send + 'static,
    {
        let path = dir.join(format!("{}.json", name));
        let store_name = name.to_string();
        let file_path = path.clone();

        let records = tokio::task::spawn_blocking(move || {
            Self::open_blocking(&file_path, &store_name, version, upgrade)
        })
        .await??;

        tracing::debug!("[KvStore] Opened '{}' (version {}) at {:?}", name, version, path);

        Ok(Self {
            name: name.to_string(),
            version,
            path,
            records: Arc::new(Mutex::new(records)),
        })
    }

    fn open_blocking<F>(path: &Path, name: &str, version: u32, upgrade: F) -> Result<Records>
    where
        F: FnOnce(&mut Upgrade<'_>) -> Result<()>,
    {
        let _lock = FileLock::acquire(path)?;

        let mut document = Self::read_document(path)?.unwrap_or_else(|| StoreDocument {
            name: name.to_string(),
            version: 0,
            records: Records::new(),
        });

        if document.version > version {
            return Err(ScribeError::storage(format!(
                "store '{}' has version {}, newer than requested {}",
                name, document.version, version
            )));
        }

        if document.version < version {
            tracing::info!(
                "[KvStore] Upgrading '{}' from version {} to {}",
                name,
                document.version,
                version
            );
            let mut tx = Upgrade {
                old_version: document.version,
                new_version: version,
                records: &mut document.records,
            };
            upgrade(&mut tx)?;
            document.version = version;
            document.name = name.to_string();
            write_atomic(path, &serde_json::to_vec_pretty(&document)?)?;
        }

        Ok(document.records)
    }

    fn read_document(path: &Path) -> Result<Option<StoreDocument>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read(path)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice(&content) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                tracing::warn!("[KvStore] Discarding unreadable store {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record under `key`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let value = self.records.lock().await.get(key).cloned();
        match value {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Writes `value` under `key` and persists the store.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut records = self.records.lock().await;

        let mut updated = records.clone();
        updated.insert(key.to_string(), value);
        let document = StoreDocument {
            name: self.name.clone(),
            version: self.version,
            records: updated,
        };

        let path = self.path.clone();
        let document = tokio::task::spawn_blocking(move || -> Result<StoreDocument> {
            let _lock = FileLock::acquire(&path)?;
            write_atomic(&path, &serde_json::to_vec_pretty(&document)?)?;
            Ok(document)
        })
        .await??;

        *records = document.records;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    async fn open(dir: &Path, version: u32) -> KvStore {
        KvStore::open_or_create(dir, "test-store", version, |tx| {
            tx.clear();
            Ok(())
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(temp_dir.path(), 1).await;

        let value: Option<Vec<String>> = store.get("absent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_put_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(temp_dir.path(), 1).await;
        store
            .put("names", &vec!["a.txt".to_string(), "b.txt".to_string()])
            .await
            .unwrap();
        drop(store);

        let reopened = open(temp_dir.path(), 1).await;
        let names: Option<Vec<String>> = reopened.get("names").await.unwrap();
        assert_eq!(names, Some(vec!["a.txt".to_string(), "b.txt".to_string()]));
    }

    #[tokio::test]
    async fn test_upgrade_runs_only_for_older_versions() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicU32::new(0));

        for expected_old in [0, 1] {
            let counter = calls.clone();
            KvStore::open_or_create(temp_dir.path(), "versions", 1, move |tx| {
                assert_eq!(tx.old_version(), expected_old);
                assert_eq!(tx.new_version(), 1);
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
        }

        // Second open found version 1 already; no hook call.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_destructive_upgrade_drops_old_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(temp_dir.path(), 1).await;
        store.put("names", &vec!["a.txt".to_string()]).await.unwrap();
        drop(store);

        let upgraded = open(temp_dir.path(), 2).await;
        assert_eq!(upgraded.version(), 2);
        let names: Option<Vec<String>> = upgraded.get("names").await.unwrap();
        assert!(names.is_none());
    }

    #[tokio::test]
    async fn test_newer_store_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        open(temp_dir.path(), 3).await;

        let result = KvStore::open_or_create(temp_dir.path(), "test-store", 2, |_| Ok(())).await;

        assert!(matches!(result, Err(ScribeError::Storage(_))));
    }

    #[tokio::test]
    async fn test_corrupt_store_is_reset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test-store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = open(temp_dir.path(), 1).await;
        let value: Option<Vec<String>> = store.get("names").await.unwrap();
        assert!(value.is_none());

        store.put("names", &vec!["a.txt".to_string()]).await.unwrap();
        drop(store);
        let reopened = open(temp_dir.path(), 1).await;
        let names: Option<Vec<String>> = reopened.get("names").await.unwrap();
        assert_eq!(names, Some(vec!["a.txt".to_string()]));
    }

    #[tokio::test]
    async fn test_corrupt_store_runs_upgrade_from_zero() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("versions.json"), [0xff, 0x00, 0x7b]).unwrap();
        let seen = Arc::new(AtomicU32::new(u32::MAX));

        let recorded = seen.clone();
        KvStore::open_or_create(temp_dir.path(), "versions", 2, move |tx| {
            recorded.store(tx.old_version(), Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_hook_leaves_store_unopened() {
        let temp_dir = TempDir::new().unwrap();

        let result = KvStore::open_or_create(temp_dir.path(), "test-store", 1, |_| {
            Err(ScribeError::storage("hook failed"))
        })
        .await;

        assert!(result.is_err());
        assert!(!temp_dir.path().join("test-store.json").exists());
    }
}
