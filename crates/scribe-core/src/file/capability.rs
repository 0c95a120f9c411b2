//! Host capability traits for picking, reading and writing files.

use async_trait::async_trait;
use std::sync::Arc;

use super::reference::{AccessMode, FileReference, PermissionState};
use crate::error::Result;

/// A revocable capability to one file.
///
/// The handle may become invalid at any time (file moved, deleted, or access
/// revoked outside the app); every method reports that as an error.
#[async_trait]
pub trait FileHandle: Send + Sync {
    fn reference(&self) -> &FileReference;

    /// Current grant state for `mode`, without prompting.
    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState>;

    /// Asks the user (or host policy) for `mode` and returns the outcome.
    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState>;

    /// Reads the whole file.
    async fn read_all(&self) -> Result<Vec<u8>>;

    /// Opens a write transaction that replaces the whole file on commit.
    async fn create_writable(&self) -> Result<Box<dyn WritableFile>>;
}

/// A pending whole-file write.
///
/// Dropping without [`WritableFile::commit`] leaves the original file untouched.
#[async_trait]
pub trait WritableFile: Send {
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Resolves persisted references into live handles.
pub trait FileHost: Send + Sync {
    fn handle(&self, reference: &FileReference) -> Arc<dyn FileHandle>;
}

/// Interactive file picker.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Returns `Ok(None)` when the user dismisses the picker.
    async fn pick(&self) -> Result<Option<FileReference>>;
}
