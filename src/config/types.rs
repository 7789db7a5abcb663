//! Core configuration types and loading.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::gateway::GatewayConfig;
use super::keys::KeysConfig;
use super::moderation::{DownloadConfig, ModerationConfig};

/// Environment variable that overrides `bot.token`.
pub const TOKEN_ENV: &str = "KEYWARD_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and guild binding.
    pub bot: BotConfig,
    /// Key ledger configuration.
    #[serde(default)]
    pub keys: KeysConfig,
    /// Gateway and REST endpoints.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Buyer download link.
    #[serde(default)]
    pub download: DownloadConfig,
    /// Moderation limits.
    #[serde(default)]
    pub moderation: ModerationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A non-empty `KEYWARD_TOKEN` environment variable replaces `bot.token`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            config.bot.token = token;
        }
        Ok(config)
    }
}

/// Bot identity and the guild it moderates.
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    /// Bot token. May be left empty and supplied via `KEYWARD_TOKEN`.
    #[serde(default)]
    pub token: String,
    /// Application id, used to register slash commands.
    pub application_id: String,
    /// Guild the bot serves.
    pub guild_id: String,
    /// Role granted on key redemption.
    pub buyer_role_id: String,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("application_id", &self.application_id)
            .field("guild_id", &self.guild_id)
            .field("buyer_role_id", &self.buyer_role_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyBackend;

    const MINIMAL: &str = r#"
[bot]
token = "abc"
application_id = "100"
guild_id = "200"
buyer_role_id = "300"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.bot.guild_id, "200");
        assert_eq!(config.keys.backend, KeyBackend::Json);
        assert_eq!(config.keys.path, "keylist.json");
        assert_eq!(config.keys.sweep_interval_secs, 3600);
        assert_eq!(config.moderation.timeout_max_minutes, 60);
        assert!(config.download.url.is_none());
        assert!(config.gateway.url.starts_with("wss://"));
    }

    #[test]
    fn debug_redacts_token() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let rendered = format!("{:?}", config.bot);
        assert!(!rendered.contains("abc"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.bot.application_id, "100");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/keyward.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn missing_bot_section_is_parse_error() {
        let err = toml::from_str::<Config>("[keys]\npath = \"x.json\"\n").unwrap_err();
        assert!(err.to_string().contains("bot"));
    }
}
