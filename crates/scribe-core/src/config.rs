use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default idle time before an edit is autosaved.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 800;

/// Default time the "saved" status stays visible.
pub const DEFAULT_STATUS_REVERT_MS: u64 = 1500;

/// Editor tunables, stored in `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
    #[serde(default = "default_status_revert_ms")]
    pub status_revert_ms: u64,
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

fn default_status_revert_ms() -> u64 {
    DEFAULT_STATUS_REVERT_MS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            status_revert_ms: DEFAULT_STATUS_REVERT_MS,
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn status_revert_delay(&self) -> Duration {
        Duration::from_millis(self.status_revert_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EditorConfig = toml::from_str("autosave_delay_ms = 250").unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(250));
        assert_eq!(config.status_revert_ms, DEFAULT_STATUS_REVERT_MS);
    }
}
