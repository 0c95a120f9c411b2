use async_trait::async_trait;

use scribe_core::file::{AccessMode, FileReference};

/// Asks the user whether `mode` access to a file may be granted.
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    async fn confirm(&self, reference: &FileReference, mode: AccessMode) -> bool;
}

/// Non-interactive prompt answering from a fixed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPrompt {
    AllowAll,
    DenyAll,
    /// Grants reads, refuses writes.
    ReadOnly,
}

impl AutoPrompt {
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    pub fn deny_all() -> Self {
        Self::DenyAll
    }

    pub fn read_only() -> Self {
        Self::ReadOnly
    }
}

#[async_trait]
impl PermissionPrompt for AutoPrompt {
    async fn confirm(&self, reference: &FileReference, mode: AccessMode) -> bool {
        let allowed = match self {
            AutoPrompt::AllowAll => true,
            AutoPrompt::DenyAll => false,
            AutoPrompt::ReadOnly => mode == AccessMode::Read,
        };
        tracing::debug!(
            "[AutoPrompt] {} access to {}: {}",
            mode,
            reference,
            if allowed { "granted" } else { "refused" }
        );
        allowed
    }
}
