//! Chronicler - Discord bot for WoW armory data
//!
//! Aggregates the Battle.net game-data API and the Raider.IO ranking API
//! behind slash commands: character overviews, guild roster summaries,
//! realm status and guild item-level rankings.

mod api;
mod common;
mod config;
mod discord;
mod services;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info};

use services::Services;

/// Upstream calls get this long before the request is abandoned.
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Chronicler v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = config::load_and_validate().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Set DISCORD_TOKEN, BLIZZARD_CLIENT_ID and BLIZZARD_CLIENT_SECRET.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Region: {}", config.wow.region);
    info!("  Locale: {}", config.wow.locale);
    match config.discord.guild_id {
        Some(id) => info!("  Command sync: guild {}", id),
        None => info!("  Command sync: global"),
    }

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let services = Arc::new(Services::new(http, &config));

    let mut client = discord::build_client(&config, services).await?;
    let shard_manager = client.shard_manager.clone();

    info!("Starting Discord bot...");
    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {:?}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            shard_manager.shutdown_all().await;
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
