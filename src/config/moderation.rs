//! Moderation limits and the buyer download link.

use serde::Deserialize;
use std::time::Duration;

/// Moderation command limits.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Longest timeout `.timeout` accepts, in minutes.
    #[serde(default = "default_timeout_max")]
    pub timeout_max_minutes: u32,
    /// Seconds before the purge confirmation deletes itself.
    #[serde(default = "default_purge_notice")]
    pub purge_notice_secs: u64,
}

impl ModerationConfig {
    /// Purge notice lifetime as a `Duration`.
    pub fn purge_notice(&self) -> Duration {
        Duration::from_secs(self.purge_notice_secs)
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            timeout_max_minutes: default_timeout_max(),
            purge_notice_secs: default_purge_notice(),
        }
    }
}

fn default_timeout_max() -> u32 {
    60
}

fn default_purge_notice() -> u64 {
    5
}

/// Link DM'd to buyers by `.download`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadConfig {
    /// Download URL. `.download` reports that no link is configured when unset.
    pub url: Option<String>,
}
