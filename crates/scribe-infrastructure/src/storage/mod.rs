//! On-disk persistence primitives.

pub mod atomic_file;
pub mod kv_store;
pub mod toml_file;

pub use atomic_file::{AtomicFileError, FileLock, write_atomic};
pub use kv_store::{KvStore, Upgrade};
pub use toml_file::TomlFile;
