//! Session state value and its transitions.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, ScribeError};
use crate::file::{FileHandle, FileReference};

/// Lifecycle of the editing session.
///
/// `Empty → ReadOnly → Editable`; the only way back to `ReadOnly` is loading a file again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    ReadOnly,
    Editable,
    /// The last open attempt failed. The previous file stays loaded underneath.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Empty => "empty",
            SessionState::ReadOnly => "read-only",
            SessionState::Editable => "editable",
            SessionState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Status line content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    NoFile,
    Opened { name: String, editable: bool },
    Saved { name: String },
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoFile => write!(f, "No file open"),
            Status::Opened {
                name,
                editable: false,
            } => write!(f, "Opened {} (read-only)", name),
            Status::Opened {
                name,
                editable: true,
            } => write!(f, "Editing {}", name),
            Status::Saved { name } => write!(f, "Saved {}", name),
            Status::Error(message) => write!(f, "{}", message),
        }
    }
}

/// Which UI controls are usable in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub editor: bool,
    pub save: bool,
    pub unlock: bool,
}

impl Controls {
    pub fn for_state(state: SessionState) -> Self {
        match state {
            SessionState::Empty | SessionState::Failed => Self::default(),
            SessionState::ReadOnly => Self {
                editor: false,
                save: false,
                unlock: true,
            },
            SessionState::Editable => Self {
                editor: true,
                save: true,
                unlock: false,
            },
        }
    }
}

/// Read-only snapshot handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: Uuid,
    pub state: SessionState,
    pub name: Option<String>,
    pub text: String,
    pub dirty: bool,
    pub status: Status,
    pub controls: Controls,
}

/// What a save needs, captured under the session lock.
pub(crate) struct SaveTicket {
    pub session_id: Uuid,
    pub handle: Arc<dyn FileHandle>,
    pub text: String,
}

/// Why `save` did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotEditable,
    Clean,
    InFlight,
}

/// Outcome of a save that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Skipped(SkipReason),
}

/// The mutable editing state for one opened file.
pub struct Session {
    id: Uuid,
    handle: Option<Arc<dyn FileHandle>>,
    state: SessionState,
    /// Set by a failed open; cleared by the next edit, unlock or save.
    open_failed: bool,
    text: String,
    saved_text: String,
    status: Status,
}

impl Session {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            handle: None,
            state: SessionState::Empty,
            open_failed: false,
            text: String::new(),
            saved_text: String::new(),
            status: Status::NoFile,
        }
    }

    /// A freshly loaded, read-only session.
    pub fn loaded(handle: Arc<dyn FileHandle>, text: String) -> Self {
        let name = handle.reference().display_name();
        Self {
            id: Uuid::new_v4(),
            handle: Some(handle),
            state: SessionState::ReadOnly,
            open_failed: false,
            saved_text: text.clone(),
            text,
            status: Status::Opened {
                name,
                editable: false,
            },
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `Failed` after a failed open, otherwise the state of the loaded file.
    pub fn state(&self) -> SessionState {
        if self.open_failed {
            SessionState::Failed
        } else {
            self.state
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn reference(&self) -> Option<&FileReference> {
        self.handle.as_ref().map(|handle| handle.reference())
    }

    /// True iff the editor text differs from what was last written.
    pub fn is_dirty(&self) -> bool {
        self.text != self.saved_text
    }

    fn name(&self) -> String {
        self.reference()
            .map(FileReference::display_name)
            .unwrap_or_default()
    }

    fn invalid(&self, operation: &'static str) -> ScribeError {
        ScribeError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }

    /// Marks the last open attempt as failed.
    ///
    /// The loaded file keeps its state, text and dirty flag, so an editable
    /// session can still be edited and saved.
    pub fn fail(&mut self, error: &ScribeError) {
        self.open_failed = true;
        self.status = Status::Error(error.status_text());
    }

    fn clear_failure(&mut self) {
        if self.open_failed {
            self.open_failed = false;
            self.status = Status::Opened {
                name: self.name(),
                editable: self.state == SessionState::Editable,
            };
        }
    }

    /// Handle to request write access for; only valid while read-only.
    pub fn unlock_target(&self) -> Result<Arc<dyn FileHandle>> {
        match (&self.handle, self.state) {
            (Some(handle), SessionState::ReadOnly) => Ok(handle.clone()),
            _ => Err(self.invalid("unlock")),
        }
    }

    pub fn make_editable(&mut self) -> Result<()> {
        if self.state != SessionState::ReadOnly {
            return Err(self.invalid("unlock"));
        }
        self.state = SessionState::Editable;
        self.open_failed = false;
        self.status = Status::Opened {
            name: self.name(),
            editable: true,
        };
        Ok(())
    }

    pub fn show_error(&mut self, error: &ScribeError) {
        self.status = Status::Error(error.status_text());
    }

    /// Replaces the editor text. Returns the resulting dirty flag.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<bool> {
        if self.state != SessionState::Editable {
            return Err(self.invalid("edit"));
        }
        self.text = text.into();
        self.clear_failure();
        if self.is_dirty() && matches!(self.status, Status::Saved { .. }) {
            self.status = Status::Opened {
                name: self.name(),
                editable: true,
            };
        }
        Ok(self.is_dirty())
    }

    pub(crate) fn save_ticket(&self) -> std::result::Result<SaveTicket, SkipReason> {
        let handle = match (&self.handle, self.state) {
            (Some(handle), SessionState::Editable) => handle.clone(),
            _ => return Err(SkipReason::NotEditable),
        };
        if !self.is_dirty() {
            return Err(SkipReason::Clean);
        }
        Ok(SaveTicket {
            session_id: self.id,
            handle,
            text: self.text.clone(),
        })
    }

    /// Records that `written` is now on disk.
    pub fn mark_saved(&mut self, written: String) {
        self.saved_text = written;
        self.open_failed = false;
        self.status = if self.is_dirty() {
            Status::Opened {
                name: self.name(),
                editable: true,
            }
        } else {
            Status::Saved { name: self.name() }
        };
    }

    /// Returns the "saved" status to the neutral one unless edits arrived since.
    pub fn revert_saved_status(&mut self) {
        if !self.is_dirty() && matches!(self.status, Status::Saved { .. }) {
            self.status = Status::Opened {
                name: self.name(),
                editable: self.state == SessionState::Editable,
            };
        }
    }

    pub fn view(&self) -> SessionView {
        let state = self.state();
        SessionView {
            id: self.id,
            state,
            name: self.reference().map(FileReference::display_name),
            text: self.text.clone(),
            dirty: self.is_dirty(),
            status: self.status.clone(),
            controls: Controls::for_state(state),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("file", &self.reference())
            .field("state", &self.state)
            .field("open_failed", &self.open_failed)
            .field("dirty", &self.is_dirty())
            .field("status", &self.status)
            .finish()
    }
}
