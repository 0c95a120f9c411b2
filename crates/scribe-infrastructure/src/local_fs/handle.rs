use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::ledger::PermissionLedger;
use super::prompt::PermissionPrompt;
use crate::storage::atomic_file::temp_path_for;
use scribe_core::file::{AccessMode, FileHandle, FileReference, PermissionState, WritableFile};
use scribe_core::{Result, ScribeError};

/// Handle to a file on the local filesystem.
///
/// Reads and writes require a grant in the shared ledger; the handle never
/// prompts on its own except from [`FileHandle::request_permission`].
pub struct LocalFileHandle {
    reference: FileReference,
    ledger: PermissionLedger,
    prompt: Arc<dyn PermissionPrompt>,
}

impl LocalFileHandle {
    pub fn new(
        reference: FileReference,
        ledger: PermissionLedger,
        prompt: Arc<dyn PermissionPrompt>,
    ) -> Self {
        Self {
            reference,
            ledger,
            prompt,
        }
    }

    fn require(&self, mode: AccessMode) -> Result<()> {
        if self.ledger.granted(self.reference.location(), mode) {
            Ok(())
        } else {
            Err(ScribeError::permission_denied(
                mode,
                self.reference.display_name(),
            ))
        }
    }
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    fn reference(&self) -> &FileReference {
        &self.reference
    }

    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        let metadata = fs::metadata(self.reference.location()).await?;
        if !metadata.is_file() {
            return Err(ScribeError::unavailable(format!(
                "{} is not a regular file",
                self.reference
            )));
        }
        if mode == AccessMode::ReadWrite && metadata.permissions().readonly() {
            return Ok(PermissionState::Denied);
        }
        if self.ledger.granted(self.reference.location(), mode) {
            Ok(PermissionState::Granted)
        } else {
            Ok(PermissionState::Prompt)
        }
    }

    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        match self.query_permission(mode).await? {
            PermissionState::Prompt => {}
            settled => return Ok(settled),
        }

        if self.prompt.confirm(&self.reference, mode).await {
            self.ledger.grant(self.reference.location(), mode);
            tracing::info!("[LocalFs] Granted {} access to {}", mode, self.reference);
            Ok(PermissionState::Granted)
        } else {
            tracing::info!("[LocalFs] Refused {} access to {}", mode, self.reference);
            Ok(PermissionState::Denied)
        }
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        self.require(AccessMode::Read)?;
        Ok(fs::read(self.reference.location()).await?)
    }

    async fn create_writable(&self) -> Result<Box<dyn WritableFile>> {
        self.require(AccessMode::ReadWrite)?;

        let target = self.reference.location().to_path_buf();
        let tmp_path = temp_path_for(&target)?;
        let file = File::create(&tmp_path).await?;

        Ok(Box::new(LocalWritable {
            file: Some(file),
            tmp_path,
            target,
            committed: false,
        }))
    }
}

/// Write transaction staged in a hidden sibling and renamed over the target on commit.
///
/// Dropped uncommitted, the staging file is removed and the target is untouched.
pub struct LocalWritable {
    file: Option<File>,
    tmp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl LocalWritable {
    fn file(&mut self) -> Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| ScribeError::internal("writable already closed"))
    }
}

#[async_trait]
impl WritableFile for LocalWritable {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.file()?.write_all(bytes).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let mut file = this
            .file
            .take()
            .ok_or_else(|| ScribeError::internal("writable already closed"))?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        // Keep the original file's mode bits.
        if let Ok(metadata) = fs::metadata(&this.target).await {
            fs::set_permissions(&this.tmp_path, metadata.permissions()).await?;
        }

        fs::rename(&this.tmp_path, &this.target).await?;
        this.committed = true;
        tracing::debug!("[LocalFs] Committed write to {:?}", this.target);
        Ok(())
    }
}

impl Drop for LocalWritable {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}
