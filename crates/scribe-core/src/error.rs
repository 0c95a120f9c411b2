//! Error types for the Scribe editor.

use crate::file::AccessMode;
use thiserror::Error;

/// Coarse failure categories shown to the user.
///
/// Every [`ScribeError`] maps onto exactly one of these via [`ScribeError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The picker was dismissed. Not an error; prior state resumes silently.
    UserCancelled,
    /// A permission prompt was answered with "no" or the host refused it.
    PermissionDenied,
    /// File moved or deleted, store inaccessible.
    ResourceUnavailable,
    /// Read/write error in the middle of an operation.
    TransientIo,
}

/// A shared error type for the whole Scribe workspace.
///
/// Typed variants with automatic conversion from the common error types via `From`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScribeError {
    /// File picker dismissed by the user.
    #[error("File selection cancelled")]
    UserCancelled,

    /// Permission refused for the requested access mode.
    #[error("Permission denied: {mode} access to '{name}'")]
    PermissionDenied { mode: AccessMode, name: String },

    /// The file or the store can no longer be reached.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Embedded store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Operation not valid in the current session state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScribeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a PermissionDenied error
    pub fn permission_denied(mode: AccessMode, name: impl Into<String>) -> Self {
        Self::PermissionDenied {
            mode,
            name: name.into(),
        }
    }

    /// Creates a ResourceUnavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ResourceUnavailable(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// Maps the error onto the user-facing failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserCancelled => ErrorKind::UserCancelled,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::ResourceUnavailable(_)
            | Self::Storage(_)
            | Self::NotFound { .. } => ErrorKind::ResourceUnavailable,
            Self::Io { .. }
            | Self::Serialization { .. }
            | Self::InvalidState { .. }
            | Self::Internal(_) => ErrorKind::TransientIo,
        }
    }

    /// Check if this is a user cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }

    /// Check if this is a permission denial
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Short human-readable text for the status line.
    pub fn status_text(&self) -> String {
        match self {
            Self::UserCancelled => "Cancelled".to_string(),
            Self::PermissionDenied { mode, name } => match mode {
                AccessMode::Read => format!("Permission to read {} was denied", name),
                AccessMode::ReadWrite => format!("Permission to edit {} was denied", name),
            },
            Self::ResourceUnavailable(message) => format!("Unavailable: {}", message),
            Self::NotFound { entity_type, id } => format!("No {} '{}'", entity_type, id),
            Self::InvalidState { operation, state } => {
                format!("Cannot {} while {}", operation, state)
            }
            other => match other.kind() {
                ErrorKind::ResourceUnavailable => format!("Unavailable: {}", other),
                _ => format!("Error: {}", other),
            },
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ScribeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ResourceUnavailable(err.to_string()),
            kind => Self::Io {
                message: format!("{} (kind: {:?})", err, kind),
            },
        }
    }
}

impl From<serde_json::Error> for ScribeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ScribeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ScribeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ScribeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Failed to join task: {}", err))
    }
}

/// A type alias for `Result<T, ScribeError>`.
pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_unavailable() {
        let err: ScribeError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    }

    #[test]
    fn test_other_io_errors_are_transient() {
        let err: ScribeError =
            std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted").into();
        assert!(matches!(err, ScribeError::Io { .. }));
        assert_eq!(err.kind(), ErrorKind::TransientIo);
    }

    #[test]
    fn test_status_text_for_denied_edit() {
        let err = ScribeError::permission_denied(AccessMode::ReadWrite, "notes.txt");
        assert_eq!(err.status_text(), "Permission to edit notes.txt was denied");
        assert!(err.is_permission_denied());
    }
}
