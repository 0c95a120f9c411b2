//! Unified path management for scribe's own files.
//!
//! Everything the editor persists about itself (configuration, the
//! recent-files store, logs) lives under the directories resolved here.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolver for scribe.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/scribe/            # Config directory
/// ├── config.toml              # Editor configuration
/// └── logs/                    # Application logs
///     └── scribe.log.YYYY-MM-DD
///
/// ~/.local/share/scribe/       # Data directory
/// └── store/                   # Embedded key-value stores
///     └── scribe-recent.json
/// ```
///
/// With an explicit base directory, `config/` and `data/` are created under it instead.
#[derive(Debug, Clone, Default)]
pub struct ScribePaths {
    base: Option<PathBuf>,
}

impl ScribePaths {
    const APP_DIR: &'static str = "scribe";

    /// Creates a resolver; `None` uses the platform directories.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the configuration directory (e.g., `~/.config/scribe/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (e.g., `~/.local/share/scribe/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Directory holding the embedded key-value stores.
    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
