//! Recent-files repository backed by the embedded key-value store.
//!
//! The store is opened once at startup. A corrupt store file is reset to an
//! empty list. If opening still fails (permissions, a store written by a
//! newer build) the repository stays usable but every call reports a storage
//! error, which the recent-files service turns into an empty list.

use async_trait::async_trait;
use std::path::Path;

use crate::dto::RecentListRecord;
use crate::storage::KvStore;
use scribe_core::recent::{RecentFilesRepository, RecentList};
use scribe_core::{Result, ScribeError};

/// Name of the embedded store holding the recent-files list.
pub const STORE_NAME: &str = "scribe-recent";

/// Schema version of the recent-files store.
pub const RECENT_STORE_VERSION: u32 = 1;

const RECENT_FILES_KEY: &str = "recent-files";

pub struct KvRecentFilesRepository {
    store: Option<KvStore>,
}

impl KvRecentFilesRepository {
    /// Opens (or creates) the store in `store_dir`.
    ///
    /// Upgrading from an older schema discards everything stored before.
    /// Never fails; see the module docs.
    pub async fn open(store_dir: &Path) -> Self {
        let store = KvStore::open_or_create(store_dir, STORE_NAME, RECENT_STORE_VERSION, |tx| {
            if tx.old_version() > 0 {
                tracing::info!(
                    "[RecentRepository] Discarding recent files stored with version {}",
                    tx.old_version()
                );
            }
            tx.clear();
            Ok(())
        })
        .await;

        match store {
            Ok(store) => Self { store: Some(store) },
            Err(e) => {
                tracing::warn!(
                    "[RecentRepository] Recent-files store unavailable, continuing without it: {}",
                    e
                );
                Self { store: None }
            }
        }
    }

    /// Whether the backing store was opened.
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&KvStore> {
        self.store
            .as_ref()
            .ok_or_else(|| ScribeError::storage("recent-files store is unavailable"))
    }
}

#[async_trait]
impl RecentFilesRepository for KvRecentFilesRepository {
    async fn get(&self) -> Result<RecentList> {
        let record: Option<RecentListRecord> = self.store()?.get(RECENT_FILES_KEY).await?;
        Ok(record.map(RecentListRecord::into_domain).unwrap_or_default())
    }

    async fn put(&self, list: &RecentList) -> Result<()> {
        self.store()?
            .put(RECENT_FILES_KEY, &RecentListRecord::from(list))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::file::FileReference;
    use scribe_core::recent::RecentEntry;
    use tempfile::TempDir;

    fn list_of(paths: &[&str]) -> RecentList {
        let mut list = RecentList::new();
        for path in paths.iter().rev() {
            list.record(RecentEntry::new(FileReference::new(*path)));
        }
        list
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        let repository = KvRecentFilesRepository::open(temp_dir.path()).await;

        assert!(repository.is_available());
        assert!(repository.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let repository = KvRecentFilesRepository::open(temp_dir.path()).await;
        repository
            .put(&list_of(&["/notes/a.txt", "/notes/b.txt"]))
            .await
            .unwrap();
        drop(repository);

        let reopened = KvRecentFilesRepository::open(temp_dir.path()).await;

        assert_eq!(reopened.get().await.unwrap().names(), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_older_store_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(format!("{}.json", STORE_NAME)),
            r#"{"name":"scribe-recent","version":0,"records":{"recent-files":{"entries":[{"location":"/old.txt","openedAt":"2024-01-01T00:00:00Z"}]}}}"#,
        )
        .unwrap();

        let repository = KvRecentFilesRepository::open(temp_dir.path()).await;

        assert!(repository.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_store_starts_empty_and_recovers() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(format!("{}.json", STORE_NAME)),
            r#"{"name":"scribe-recent","version":1,"records":"#,
        )
        .unwrap();

        let repository = KvRecentFilesRepository::open(temp_dir.path()).await;
        assert!(repository.is_available());
        assert!(repository.get().await.unwrap().is_empty());

        repository.put(&list_of(&["/notes/a.txt"])).await.unwrap();
        drop(repository);
        let reopened = KvRecentFilesRepository::open(temp_dir.path()).await;
        assert_eq!(reopened.get().await.unwrap().names(), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_newer_store_makes_repository_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(format!("{}.json", STORE_NAME)),
            r#"{"name":"scribe-recent","version":99,"records":{}}"#,
        )
        .unwrap();

        let repository = KvRecentFilesRepository::open(temp_dir.path()).await;

        assert!(!repository.is_available());
        assert!(matches!(repository.get().await, Err(ScribeError::Storage(_))));
        assert!(repository.put(&RecentList::new()).await.is_err());
    }
}
