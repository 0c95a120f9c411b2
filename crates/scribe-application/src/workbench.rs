//! Workbench use cases.
//!
//! The `Workbench` owns the one editing session and everything around it:
//!
//! - resolving references through the [`FileHost`]
//! - restarting the autosave timer on every edit
//! - flushing a pending autosave before the session is replaced or the app exits
//! - exposing the recent-files list
//!
//! Every operation returns the session's own `Result`; the status line in
//! [`SessionView`] already carries the user-facing message.

use std::sync::Arc;

use scribe_core::autosave::AutosaveScheduler;
use scribe_core::config::EditorConfig;
use scribe_core::file::{FileHost, FilePicker, FileReference};
use scribe_core::recent::{RecentFiles, RecentFilesRepository, RecentList};
use scribe_core::session::{FileSession, SaveOutcome, SessionView};
use scribe_core::{Result, ScribeError};

pub struct Workbench {
    host: Arc<dyn FileHost>,
    session: Arc<FileSession>,
    autosave: AutosaveScheduler,
    recent: Arc<RecentFiles>,
}

impl Workbench {
    /// Creates a workbench with an empty session.
    pub fn new(
        host: Arc<dyn FileHost>,
        recent_repository: Arc<dyn RecentFilesRepository>,
        config: &EditorConfig,
    ) -> Self {
        let recent = Arc::new(RecentFiles::new(recent_repository));
        let session = Arc::new(FileSession::new(recent.clone(), config));
        let autosave = AutosaveScheduler::new(session.clone(), config.autosave_delay());

        Self {
            host,
            session,
            autosave,
            recent,
        }
    }

    pub async fn view(&self) -> SessionView {
        self.session.view().await
    }

    /// True while an autosave timer is waiting.
    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Opens `reference` read-only.
    ///
    /// Unsaved edits of the current file are written first.
    pub async fn open_reference(&self, reference: &FileReference) -> Result<SessionView> {
        self.flush_pending().await;
        self.session.open(self.host.handle(reference)).await
    }

    /// Opens the outcome of resolving a user-supplied location.
    ///
    /// A resolution error fails the open attempt the same way an unreadable
    /// file does.
    pub async fn open_resolved(&self, resolved: Result<FileReference>) -> Result<SessionView> {
        match resolved {
            Ok(reference) => self.open_reference(&reference).await,
            Err(e) => {
                self.session.fail_open(&e).await;
                Err(e)
            }
        }
    }

    /// Lets the user pick a file and opens it.
    ///
    /// Returns `Ok(None)` if the picker was dismissed; the current session is untouched.
    pub async fn pick_and_open(&self, picker: &dyn FilePicker) -> Result<Option<SessionView>> {
        let reference = match picker.pick().await {
            Ok(Some(reference)) => reference,
            Ok(None) => {
                tracing::debug!("[Workbench] File selection cancelled");
                return Ok(None);
            }
            Err(e) if e.is_cancelled() => {
                tracing::debug!("[Workbench] File selection cancelled");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("[Workbench] File picker failed: {}", e);
                self.session.fail_open(&e).await;
                return Err(e);
            }
        };

        self.open_reference(&reference).await.map(Some)
    }

    /// Opens the `index`-th most recent file (0 = most recent).
    pub async fn reopen_recent(&self, index: usize) -> Result<SessionView> {
        let entry = self
            .recent
            .get(index)
            .await
            .ok_or_else(|| ScribeError::not_found("recent file", (index + 1).to_string()))?;
        self.open_reference(&entry.reference).await
    }

    /// Requests write access to the open file.
    pub async fn unlock(&self) -> Result<SessionView> {
        self.session.unlock().await
    }

    /// Replaces the editor text and restarts the autosave timer.
    pub async fn edit(&self, text: impl Into<String>) -> Result<bool> {
        let dirty = self.session.edit(text).await?;
        self.autosave.schedule();
        Ok(dirty)
    }

    /// Appends to the editor text and restarts the autosave timer.
    pub async fn append(&self, text: &str) -> Result<bool> {
        let dirty = self.session.append(text).await?;
        self.autosave.schedule();
        Ok(dirty)
    }

    /// Saves now, bypassing the debounce.
    pub async fn save(&self) -> Result<SaveOutcome> {
        self.autosave.flush().await
    }

    pub async fn recent_files(&self) -> RecentList {
        self.recent.list().await
    }

    pub async fn clear_recent(&self) {
        self.recent.clear().await;
        tracing::info!("[Workbench] Cleared recent files");
    }

    /// Writes any pending edit before the process exits.
    pub async fn shutdown(&self) -> Result<SaveOutcome> {
        tracing::info!("[Workbench] Shutting down");
        self.autosave.flush().await
    }

    async fn flush_pending(&self) {
        let timer_pending = self.autosave.cancel();
        if !timer_pending && !self.session.is_dirty().await {
            return;
        }
        if let Err(e) = self.session.save().await {
            tracing::warn!(
                "[Workbench] Pending autosave failed before switching files: {}",
                e
            );
        }
    }
}
