//! Local filesystem host.
//!
//! Files are reached through [`LocalFileHandle`]s handed out by
//! [`LocalFileHost`]. Access is granted per file and per mode by a
//! [`PermissionPrompt`] and remembered in a [`PermissionLedger`] for the
//! lifetime of the process.

mod handle;
mod host;
mod ledger;
mod prompt;

pub use handle::{LocalFileHandle, LocalWritable};
pub use host::LocalFileHost;
pub use ledger::PermissionLedger;
pub use prompt::{AutoPrompt, PermissionPrompt};
