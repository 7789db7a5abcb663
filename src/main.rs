//! keyward - moderation and key-redemption bot.

use keyward::config::{Config, KeyBackend, validation};
use keyward::handlers::{Router, Services};
use keyward::keys::{JsonFileStore, Ledger, spawn_sweep_task};
use keyward::network::GatewayClient;
use keyward::platform::DiscordRest;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        guild = %config.bot.guild_id,
        backend = ?config.keys.backend,
        "Starting keyward"
    );

    // Key ledger
    let ledger = match config.keys.backend {
        KeyBackend::Json => Ledger::open(Box::new(JsonFileStore::new(&config.keys.path)))
            .map_err(|e| {
                error!(path = %config.keys.path, error = %e, "Failed to load key list");
                e
            })?,
        KeyBackend::Memory => {
            warn!("Memory key backend selected; redeemed keys are lost on restart");
            Ledger::in_memory()
        }
    };
    let ledger = Arc::new(ledger);

    let _sweeper = spawn_sweep_task(Arc::clone(&ledger), config.keys.sweep_interval());
    info!(
        interval_secs = config.keys.sweep_interval_secs,
        "Expiry sweeper started"
    );

    // Platform REST client
    let rest = DiscordRest::new(
        &config.gateway.api_base,
        &config.bot.token,
        &config.bot.application_id,
    )?;
    match rest.register_commands(&config.bot.guild_id).await {
        Ok(()) => info!("Slash commands registered"),
        Err(e) => error!(error = %e, code = e.error_code(), "Failed to register slash commands"),
    }

    let config = Arc::new(config);
    let services = Services::new(Arc::new(rest), ledger, Arc::clone(&config));
    let router = Arc::new(Router::new(services));

    let client = GatewayClient::new(config.gateway.clone(), &config.bot.token, router);
    client.run().await;

    Ok(())
}
