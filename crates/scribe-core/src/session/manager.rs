use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::model::{SaveOutcome, SaveTicket, Session, SessionView, SkipReason};
use crate::autosave::SaveTarget;
use crate::config::EditorConfig;
use crate::error::{Result, ScribeError};
use crate::file::{AccessMode, FileHandle};
use crate::permission::verify_permission;
use crate::recent::RecentFiles;

/// Controller for the single editing session.
///
/// `FileSession` is responsible for:
/// - Loading a file read-only and recording it as recent
/// - Escalating to write access on request
/// - Writing the editor text back, re-checking write access every time
///
/// The session lock is never held across a permission prompt or file I/O.
/// Failures are logged, shown in the session status, and returned.
pub struct FileSession {
    session: Arc<Mutex<Session>>,
    saving: AtomicBool,
    /// A save was asked for since the outstanding one took its snapshot.
    save_requested: AtomicBool,
    recent: Arc<RecentFiles>,
    status_revert: Duration,
}

impl FileSession {
    pub fn new(recent: Arc<RecentFiles>, config: &EditorConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::empty())),
            saving: AtomicBool::new(false),
            save_requested: AtomicBool::new(false),
            recent,
            status_revert: config.status_revert_delay(),
        }
    }

    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view()
    }

    pub async fn is_dirty(&self) -> bool {
        self.session.lock().await.is_dirty()
    }

    /// Loads `handle` read-only, replacing the current session on success.
    ///
    /// On failure the view reports `Failed` but the previously loaded file,
    /// its text and its editability stay as they were.
    pub async fn open(&self, handle: Arc<dyn FileHandle>) -> Result<SessionView> {
        let reference = handle.reference().clone();
        tracing::info!("[FileSession] Opening {}", reference);

        match Self::load(handle.as_ref()).await {
            Ok(text) => {
                let view = {
                    let mut session = self.session.lock().await;
                    *session = Session::loaded(handle, text);
                    session.view()
                };
                self.recent.record(reference).await;
                Ok(view)
            }
            Err(e) => {
                tracing::warn!("[FileSession] Failed to open {}: {}", reference, e);
                self.session.lock().await.fail(&e);
                Err(e)
            }
        }
    }

    /// Records an open attempt that failed before a handle existed,
    /// e.g. a path that could not be resolved.
    pub async fn fail_open(&self, error: &ScribeError) {
        tracing::warn!("[FileSession] Failed to open: {}", error);
        self.session.lock().await.fail(error);
    }

    async fn load(handle: &dyn FileHandle) -> Result<String> {
        let name = handle.reference().display_name();
        if !verify_permission(handle, AccessMode::Read).await {
            return Err(ScribeError::permission_denied(AccessMode::Read, name));
        }
        let bytes = handle.read_all().await?;
        String::from_utf8(bytes)
            .map_err(|_| ScribeError::unavailable(format!("{} is not UTF-8 text", name)))
    }

    /// Requests write access and makes the session editable.
    pub async fn unlock(&self) -> Result<SessionView> {
        let (session_id, handle) = {
            let session = self.session.lock().await;
            (session.id(), session.unlock_target()?)
        };

        let granted = verify_permission(handle.as_ref(), AccessMode::ReadWrite).await;

        let mut session = self.session.lock().await;
        if session.id() != session_id {
            return Err(ScribeError::internal("session replaced while unlocking"));
        }
        if !granted {
            let error = ScribeError::permission_denied(
                AccessMode::ReadWrite,
                handle.reference().display_name(),
            );
            session.show_error(&error);
            return Err(error);
        }
        session.make_editable()?;
        tracing::info!("[FileSession] {} is now editable", handle.reference());
        Ok(session.view())
    }

    /// Replaces the editor text. Returns the dirty flag.
    pub async fn edit(&self, text: impl Into<String>) -> Result<bool> {
        self.session.lock().await.set_text(text)
    }

    /// Appends to the editor text. Returns the dirty flag.
    pub async fn append(&self, text: &str) -> Result<bool> {
        let mut session = self.session.lock().await;
        let combined = format!("{}{}", session.text(), text);
        session.set_text(combined)
    }

    /// Writes the editor text back to the file if the session is editable and dirty.
    ///
    /// A save that overlaps an outstanding one is skipped with [`SkipReason::InFlight`];
    /// the outstanding save then writes again once it finishes, so the text at the
    /// time of the skipped call still reaches the disk.
    pub async fn save(&self) -> Result<SaveOutcome> {
        self.save_requested.store(true, Ordering::SeqCst);
        let mut outcome: Option<SaveOutcome> = None;

        while self.save_requested.load(Ordering::SeqCst) {
            if self
                .saving
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                tracing::debug!("[FileSession] Save already in flight, deferring to it");
                break;
            }
            self.save_requested.store(false, Ordering::SeqCst);
            let result = self.save_once().await;
            self.saving.store(false, Ordering::SeqCst);

            outcome = match (outcome, result?) {
                (Some(SaveOutcome::Saved), _) => Some(SaveOutcome::Saved),
                (_, next) => Some(next),
            };
        }

        Ok(outcome.unwrap_or(SaveOutcome::Skipped(SkipReason::InFlight)))
    }

    /// One snapshot-and-write pass. The caller holds the `saving` flag.
    async fn save_once(&self) -> Result<SaveOutcome> {
        let ticket = {
            let session = self.session.lock().await;
            match session.save_ticket() {
                Ok(ticket) => ticket,
                Err(reason) => return Ok(SaveOutcome::Skipped(reason)),
            }
        };

        let session_id = ticket.session_id;
        let result = Self::write(&ticket).await;

        let mut session = self.session.lock().await;
        if session.id() != session_id {
            // Another file was opened meanwhile; its state is not ours to touch.
            return result.map(|_| SaveOutcome::Saved);
        }

        match result {
            Ok(()) => {
                tracing::debug!("[FileSession] Saved {}", ticket.handle.reference());
                session.mark_saved(ticket.text);
                drop(session);
                self.schedule_status_revert(session_id);
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                tracing::warn!(
                    "[FileSession] Failed to save {}: {}",
                    ticket.handle.reference(),
                    e
                );
                session.show_error(&e);
                Err(e)
            }
        }
    }

    async fn write(ticket: &SaveTicket) -> Result<()> {
        let handle = ticket.handle.as_ref();
        if !verify_permission(handle, AccessMode::ReadWrite).await {
            return Err(ScribeError::permission_denied(
                AccessMode::ReadWrite,
                handle.reference().display_name(),
            ));
        }
        let mut writable = handle.create_writable().await?;
        writable.write(ticket.text.as_bytes()).await?;
        writable.commit().await
    }

    fn schedule_status_revert(&self, session_id: uuid::Uuid) {
        let session = self.session.clone();
        let delay = self.status_revert;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.lock().await;
            if session.id() == session_id {
                session.revert_saved_status();
            }
        });
    }
}

#[async_trait]
impl SaveTarget for FileSession {
    async fn save(&self) -> Result<SaveOutcome> {
        FileSession::save(self).await
    }
}
