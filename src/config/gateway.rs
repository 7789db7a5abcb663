//! Gateway and REST endpoint configuration.

use serde::Deserialize;
use std::time::Duration;

/// Endpoints and reconnect policy for the platform connection.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway WebSocket URL.
    #[serde(default = "default_gateway_url")]
    pub url: String,
    /// REST API base URL (no trailing slash).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Seconds to wait before reconnecting a dropped session.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

impl GatewayConfig {
    /// Reconnect delay as a `Duration`.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            api_base: default_api_base(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_reconnect_delay() -> u64 {
    5
}
