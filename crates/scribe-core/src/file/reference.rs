//! File references and access modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Access mode requested from the host for a file.
///
/// `ReadWrite` strictly subsumes `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessMode {
    Read,
    ReadWrite,
}

impl AccessMode {
    /// Returns true if a grant for `self` also satisfies `requested`.
    pub fn covers(self, requested: AccessMode) -> bool {
        match (self, requested) {
            (AccessMode::ReadWrite, _) => true,
            (AccessMode::Read, AccessMode::Read) => true,
            (AccessMode::Read, AccessMode::ReadWrite) => false,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Grant state reported by the host.
///
/// "Prompt needed" and "denied" are distinct here so hosts can skip prompts
/// they know are pointless; callers only care whether it is [`PermissionState::Granted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Result of comparing a stored reference against a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCheck {
    /// Same name: the entry is superseded.
    Exclude,
    /// Different name: the entry stays.
    Keep,
    /// The comparison could not be made; the entry stays.
    Unknown,
}

/// Opaque, persistable reference to a file on the host filesystem.
///
/// The display name (last path component) is used for deduplication only;
/// two different files with the same name are indistinguishable by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileReference {
    location: PathBuf,
}

impl FileReference {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Returns the display name, or `None` when the location has no UTF-8 final component.
    pub fn name(&self) -> Option<&str> {
        self.location.file_name().and_then(|name| name.to_str())
    }

    /// Name for status lines; never fails.
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => self.location.to_string_lossy().into_owned(),
        }
    }

    /// Compares this reference's name with `name`.
    pub fn check_against(&self, name: Option<&str>) -> EntryCheck {
        match (self.name(), name) {
            (Some(own), Some(other)) if own == other => EntryCheck::Exclude,
            (Some(_), Some(_)) => EntryCheck::Keep,
            _ => EntryCheck::Unknown,
        }
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location.display())
    }
}
