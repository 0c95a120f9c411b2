//! Configuration service implementation.
//!
//! Loads the editor configuration from `config.toml` and caches it.
//! A missing file is created with the defaults; an unreadable one is
//! reported and replaced by the defaults in memory only.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::storage::TomlFile;
use scribe_core::config::EditorConfig;

/// Configuration service that loads and caches the editor configuration.
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<TomlFile<EditorConfig>>,
    /// Cached configuration, loaded lazily on first access.
    config: Arc<RwLock<Option<EditorConfig>>>,
}

impl ConfigService {
    pub fn new(config_file: PathBuf) -> Self {
        Self {
            file: Arc::new(TomlFile::new(config_file)),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> EditorConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = self.load_config();
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        loaded
    }

    fn load_config(&self) -> EditorConfig {
        match self.file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = EditorConfig::default();
                match self.file.save(&config) {
                    Ok(()) => tracing::info!(
                        "[ConfigService] Created default configuration at {:?}",
                        self.file.path()
                    ),
                    Err(e) => tracing::warn!(
                        "[ConfigService] Failed to write default configuration: {}",
                        e
                    ),
                }
                config
            }
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Failed to load {:?}, using defaults: {}",
                    self.file.path(),
                    e
                );
                EditorConfig::default()
            }
        }
    }
}
