//! Application layer for Scribe.
//!
//! Wires the host, the editing session, autosave and recent files into the
//! use cases the shell drives.

pub mod workbench;

pub use workbench::Workbench;
