//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, KeyBackend};
use std::path::Path;
use thiserror::Error;

/// Longest timeout the platform accepts (28 days), in minutes.
pub const PLATFORM_TIMEOUT_MAX_MINUTES: u32 = 28 * 24 * 60;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.token is required (or set KEYWARD_TOKEN)")]
    MissingToken,
    #[error("{field} must be a numeric id, got '{value}'")]
    InvalidSnowflake { field: &'static str, value: String },
    #[error("keys.sweep_interval_secs must be greater than 0")]
    ZeroSweepInterval,
    #[error("keys.path parent directory does not exist: {0}")]
    KeysPathInvalid(String),
    #[error("moderation.timeout_max_minutes must be between 1 and {max}, got {value}")]
    TimeoutMaxOutOfRange { value: u32, max: u32 },
    #[error("gateway.url must be a ws:// or wss:// URL, got '{0}'")]
    InvalidGatewayUrl(String),
    #[error("gateway.api_base must be an http:// or https:// URL, got '{0}'")]
    InvalidApiBase(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.token.trim().is_empty() {
        errors.push(ValidationError::MissingToken);
    }

    for (field, value) in [
        ("bot.application_id", &config.bot.application_id),
        ("bot.guild_id", &config.bot.guild_id),
        ("bot.buyer_role_id", &config.bot.buyer_role_id),
    ] {
        if !is_snowflake(value) {
            errors.push(ValidationError::InvalidSnowflake {
                field,
                value: value.clone(),
            });
        }
    }

    if config.keys.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    if config.keys.backend == KeyBackend::Json {
        let path = Path::new(&config.keys.path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::KeysPathInvalid(config.keys.path.clone()));
        }
    }

    let timeout_max = config.moderation.timeout_max_minutes;
    if timeout_max == 0 || timeout_max > PLATFORM_TIMEOUT_MAX_MINUTES {
        errors.push(ValidationError::TimeoutMaxOutOfRange {
            value: timeout_max,
            max: PLATFORM_TIMEOUT_MAX_MINUTES,
        });
    }

    let url = &config.gateway.url;
    if !(url.starts_with("wss://") || url.starts_with("ws://")) {
        errors.push(ValidationError::InvalidGatewayUrl(url.clone()));
    }
    let api = &config.gateway.api_base;
    if !(api.starts_with("https://") || api.starts_with("http://")) {
        errors.push(ValidationError::InvalidApiBase(api.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_snowflake(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[bot]
token = "token"
application_id = "1350000000000000001"
guild_id = "1350000000000000002"
buyer_role_id = "1350308568498442312"
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        config.bot.token = "  ".to_string();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingToken)));
    }

    #[test]
    fn test_non_numeric_ids_fail() {
        let toml = r#"
[bot]
token = "token"
application_id = "app"
guild_id = "1"
buyer_role_id = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        let fields: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::InvalidSnowflake { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["bot.application_id", "bot.buyer_role_id"]);
    }

    #[test]
    fn test_zero_sweep_interval_fails() {
        let toml = format!("{}\n[keys]\nsweep_interval_secs = 0\n", minimal_valid_config());
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroSweepInterval)));
    }

    #[test]
    fn test_missing_keys_directory_fails() {
        let toml = format!(
            "{}\n[keys]\npath = \"/nonexistent/dir/keylist.json\"\n",
            minimal_valid_config()
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::KeysPathInvalid(_))));
    }

    #[test]
    fn test_memory_backend_ignores_path() {
        let toml = format!(
            "{}\n[keys]\nbackend = \"memory\"\npath = \"/nonexistent/dir/keylist.json\"\n",
            minimal_valid_config()
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_timeout_max_range() {
        let mut config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        config.moderation.timeout_max_minutes = 0;
        assert!(validate(&config).is_err());
        config.moderation.timeout_max_minutes = PLATFORM_TIMEOUT_MAX_MINUTES + 1;
        assert!(validate(&config).is_err());
        config.moderation.timeout_max_minutes = PLATFORM_TIMEOUT_MAX_MINUTES;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bad_urls_fail() {
        let mut config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        config.gateway.url = "https://gateway".to_string();
        config.gateway.api_base = "ftp://api".to_string();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
