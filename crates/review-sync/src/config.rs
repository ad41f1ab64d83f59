use std::time::Duration;

use serde::Deserialize;

pub const ENV_PREFIX: &str = "REVIEW_SYNC_";

fn default_save_debounce_ms() -> u64 {
    1000
}

fn default_history_coalesce_ms() -> u64 {
    300
}

fn default_history_capacity() -> usize {
    hypr_review_document::DEFAULT_HISTORY_CAPACITY
}

fn default_flush_on_artifact_switch() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    #[serde(default = "default_history_coalesce_ms")]
    pub history_coalesce_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Save the previously active artifact immediately when the user
    /// switches to another one, instead of waiting for its own timer.
    #[serde(default = "default_flush_on_artifact_switch")]
    pub flush_on_artifact_switch: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: default_save_debounce_ms(),
            history_coalesce_ms: default_history_coalesce_ms(),
            history_capacity: default_history_capacity(),
            flush_on_artifact_switch: default_flush_on_artifact_switch(),
        }
    }
}

impl SyncConfig {
    /// Reads `REVIEW_SYNC_*` variables; unset ones keep their defaults.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> crate::Result<Self> {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn history_coalesce(&self) -> Duration {
        Duration::from_millis(self.history_coalesce_ms)
    }
}
