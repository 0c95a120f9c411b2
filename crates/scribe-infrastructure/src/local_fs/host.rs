use std::path::Path;
use std::sync::Arc;

use super::handle::LocalFileHandle;
use super::ledger::PermissionLedger;
use super::prompt::PermissionPrompt;
use scribe_core::Result;
use scribe_core::file::{FileHandle, FileHost, FileReference};

/// Hands out [`LocalFileHandle`]s sharing one ledger and one prompt.
#[derive(Clone)]
pub struct LocalFileHost {
    ledger: PermissionLedger,
    prompt: Arc<dyn PermissionPrompt>,
}

impl LocalFileHost {
    pub fn new(prompt: Arc<dyn PermissionPrompt>) -> Self {
        Self {
            ledger: PermissionLedger::new(),
            prompt,
        }
    }

    pub fn ledger(&self) -> &PermissionLedger {
        &self.ledger
    }

    /// Resolves `path` into a stable reference.
    ///
    /// Fails with a resource-unavailable error if the path does not exist.
    pub async fn reference_for(&self, path: &Path) -> Result<FileReference> {
        let location = tokio::fs::canonicalize(path).await?;
        Ok(FileReference::new(location))
    }
}

impl FileHost for LocalFileHost {
    fn handle(&self, reference: &FileReference) -> Arc<dyn FileHandle> {
        Arc::new(LocalFileHandle::new(
            reference.clone(),
            self.ledger.clone(),
            self.prompt.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_fs::AutoPrompt;
    use scribe_core::ScribeError;
    use scribe_core::file::AccessMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_handles_share_grants() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        let host = LocalFileHost::new(Arc::new(AutoPrompt::allow_all()));
        let reference = host.reference_for(&path).await.unwrap();

        host.handle(&reference)
            .request_permission(AccessMode::Read)
            .await
            .unwrap();

        let second = host.handle(&reference);
        assert_eq!(second.read_all().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_reference_for_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let host = LocalFileHost::new(Arc::new(AutoPrompt::allow_all()));

        let err = host
            .reference_for(&temp_dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::ResourceUnavailable(_)));
    }
}
