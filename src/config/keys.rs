//! Key ledger storage and sweep configuration.

use serde::Deserialize;
use std::time::Duration;

/// Backing store for the key ledger.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyBackend {
    /// JSON document on disk, rewritten atomically on every change.
    #[default]
    Json,
    /// Process memory only; keys are lost on restart.
    Memory,
}

/// Key ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct KeysConfig {
    /// Backend type: "json" or "memory".
    #[serde(default)]
    pub backend: KeyBackend,
    /// Path to the key list document.
    #[serde(default = "default_keys_path")]
    pub path: String,
    /// Seconds between expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl KeysConfig {
    /// Sweep period as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            backend: KeyBackend::default(),
            path: default_keys_path(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_keys_path() -> String {
    "keylist.json".to_string()
}

fn default_sweep_interval() -> u64 {
    3600
}
