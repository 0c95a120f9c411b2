pub mod autosave;
pub mod config;
pub mod error;
pub mod file;
pub mod permission;
pub mod recent;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export common error type
pub use error::{ErrorKind, Result, ScribeError};
