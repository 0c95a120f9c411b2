//! Permission gate.
//!
//! Checks the current grant for a file and prompts only when it is missing.

use crate::file::{AccessMode, FileHandle};

/// Ensures `mode` is granted on `handle`, prompting if necessary.
///
/// Denial is an expected outcome and comes back as `false`. Host errors while
/// querying or requesting are logged and also treated as denial.
pub async fn verify_permission(handle: &dyn FileHandle, mode: AccessMode) -> bool {
    let name = handle.reference().display_name();

    match handle.query_permission(mode).await {
        Ok(state) if state.is_granted() => return true,
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("[Permission] Query for {} on {} failed: {}", mode, name, e);
            return false;
        }
    }

    tracing::debug!("[Permission] Requesting {} access to {}", mode, name);
    match handle.request_permission(mode).await {
        Ok(state) => {
            let granted = state.is_granted();
            if !granted {
                tracing::info!("[Permission] {} access to {} not granted", mode, name);
            }
            granted
        }
        Err(e) => {
            tracing::warn!("[Permission] Request for {} on {} failed: {}", mode, name, e);
            false
        }
    }
}
