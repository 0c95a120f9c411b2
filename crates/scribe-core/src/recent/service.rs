//! Recent-files service.
//!
//! The list is a convenience cache, never a source of truth: every storage
//! failure is logged and degrades to an empty list or a skipped update.

use std::sync::Arc;

use crate::file::FileReference;
use crate::recent::model::{RecentEntry, RecentList};
use crate::recent::repository::RecentFilesRepository;

pub struct RecentFiles {
    repository: Arc<dyn RecentFilesRepository>,
}

impl RecentFiles {
    pub fn new(repository: Arc<dyn RecentFilesRepository>) -> Self {
        Self { repository }
    }

    /// Current list, or an empty one if the store cannot be read.
    pub async fn list(&self) -> RecentList {
        match self.repository.get().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("[RecentFiles] Failed to load recent files: {}", e);
                RecentList::new()
            }
        }
    }

    /// Entry at `index` in the current list.
    pub async fn get(&self, index: usize) -> Option<RecentEntry> {
        self.list().await.get(index).cloned()
    }

    /// Records `reference` as the most recently opened file and returns the new list.
    ///
    /// If the store cannot be written the new list is still returned; it just
    /// won't survive a restart.
    pub async fn record(&self, reference: FileReference) -> RecentList {
        let mut list = self.list().await;
        list.record(RecentEntry::new(reference));

        if let Err(e) = self.repository.put(&list).await {
            tracing::warn!("[RecentFiles] Failed to persist recent files: {}", e);
        }
        list
    }

    /// Forgets every remembered file.
    pub async fn clear(&self) {
        if let Err(e) = self.repository.put(&RecentList::new()).await {
            tracing::warn!("[RecentFiles] Failed to clear recent files: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRecentRepository;

    fn reference(name: &str) -> FileReference {
        FileReference::new(format!("/docs/{}", name))
    }

    #[tokio::test]
    async fn test_record_scenario() {
        let repo = Arc::new(MemoryRecentRepository::new());
        let recent = RecentFiles::new(repo.clone());

        recent.record(reference("a.txt")).await;
        recent.record(reference("b.txt")).await;
        recent.record(reference("a.txt")).await;

        assert_eq!(recent.list().await.names(), vec!["a.txt", "b.txt"]);
        assert_eq!(repo.put_count(), 3);
    }

    #[tokio::test]
    async fn test_unreadable_store_degrades_to_empty() {
        let repo = Arc::new(MemoryRecentRepository::new());
        let recent = RecentFiles::new(repo.clone());
        recent.record(reference("a.txt")).await;

        repo.fail_reads(true);
        assert!(recent.list().await.is_empty());

        // Recording still works from an empty base.
        let list = recent.record(reference("b.txt")).await;
        assert_eq!(list.names(), vec!["b.txt"]);
    }

    #[tokio::test]
    async fn test_unwritable_store_returns_list_anyway() {
        let repo = Arc::new(MemoryRecentRepository::new());
        let recent = RecentFiles::new(repo.clone());
        repo.fail_writes(true);

        let list = recent.record(reference("a.txt")).await;

        assert_eq!(list.names(), vec!["a.txt"]);
        repo.fail_writes(false);
        assert!(recent.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let repo = Arc::new(MemoryRecentRepository::new());
        let recent = RecentFiles::new(repo);
        recent.record(reference("a.txt")).await;

        recent.clear().await;

        assert!(recent.list().await.is_empty());
        assert!(recent.get(0).await.is_none());
    }
}
