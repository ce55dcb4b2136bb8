//! # channel-metrics-daemon
//!
//! Fetches public YouTube channel metrics and serves them over JSON-RPC.
//!
//! This daemon is responsible for:
//! - Resolving channel identifiers (IDs, handles, URLs, names) to channels
//! - Fetching statistics, recent uploads and monthly upload activity
//! - Serving synthetic profiles when the YouTube API is disabled or unconfigured
//!
//! ## Configuration
//!
//! The daemon reads configuration from `$XDG_CONFIG_HOME/channel-metrics/config.toml`.
//! `YOUTUBE_API_KEY` overrides the configured key.
//!
//! ## Running
//!
//! ```bash
//! # Start the daemon
//! YOUTUBE_API_KEY=... cargo run --bin channel-metrics-daemon
//!
//! # With debug logging
//! RUST_LOG=debug cargo run --bin channel-metrics-daemon
//! ```

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use channel_metrics_daemon::api;
use channel_metrics_daemon::config::Config;
use channel_metrics_daemon::service::AnalysisService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_default();

    // RUST_LOG wins over the configured level
    let log_level = config
        .as_ref()
        .map(|c| c.daemon.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(true)
        .init();

    info!("Starting channel-metrics-daemon v{}", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(cfg) => {
            info!("Loaded configuration from default path");
            cfg
        }
        Err(e) => {
            info!("Failed to load config, using defaults: {:#}", e);
            let mut cfg = Config::default();
            cfg.apply_api_key_override(std::env::var(channel_metrics_daemon::config::API_KEY_ENV).ok());
            cfg
        }
    };

    let service = Arc::new(AnalysisService::from_config(&config)?);
    info!(
        "Live data source: {}",
        if service.has_live_source() { "YouTube Data API" } else { "none (synthetic only)" }
    );

    let (server_handle, addr) = api::start_server(&config.daemon.bind_address, service).await?;

    info!("Daemon startup complete");
    info!("Listening on: {}", addr);
    info!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    server_handle.stop()?;

    info!("Daemon stopped");
    Ok(())
}
