//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BotConfig)
//! - [`keys`]: Key ledger storage and sweep configuration (KeysConfig)
//! - [`gateway`]: Gateway and REST endpoint configuration (GatewayConfig)
//! - [`moderation`]: Moderation limits and the buyer download link
//! - [`validation`]: Startup validation of the whole config

mod gateway;
mod keys;
mod moderation;
mod types;
pub mod validation;

pub use gateway::GatewayConfig;
pub use keys::{KeyBackend, KeysConfig};
pub use moderation::{DownloadConfig, ModerationConfig};
pub use types::{BotConfig, Config, ConfigError, TOKEN_ENV};
