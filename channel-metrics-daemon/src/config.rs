//! Configuration file loading and management
//!
//! This module handles loading and parsing the daemon configuration from
//! `$XDG_CONFIG_HOME/channel-metrics/config.toml`. If the configuration file
//! doesn't exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use provider_synthetic::MagnitudeMode;
use provider_youtube::YouTubeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `youtube.api_key`.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Daemon-specific configuration
    pub daemon: DaemonConfig,
    /// YouTube Data API settings
    #[serde(default)]
    pub youtube: YouTubeConfig,
    /// Synthetic fallback settings
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// Daemon server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// Bind address for the JSON-RPC server
    /// Default: "127.0.0.1:3031"
    pub bind_address: String,
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub log_level: String,
}

/// Synthetic data configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyntheticConfig {
    /// "seeded" or "cosmetic-random"
    pub mode: MagnitudeMode,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3031".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path
    ///
    /// A non-empty `YOUTUBE_API_KEY` in the environment replaces the key from
    /// the file. The environment is read here only, once.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/channel-metrics/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "raibid-labs", "channel-metrics")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the configured API key with `value` unless it is missing or blank.
    pub fn apply_api_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.youtube.api_key = Some(key);
        }
    }

    /// Create a default configuration file with documented comments
    fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    fn default_config_content() -> String {
        r#"# Channel Metrics Daemon Configuration

[daemon]
# Bind address for the JSON-RPC API server
# Default: "127.0.0.1:3031"
bind_address = "127.0.0.1:3031"

# Log level: trace, debug, info, warn, error
# Default: "info"
# RUST_LOG takes precedence when set.
log_level = "info"

[youtube]
# YouTube Data API v3 key. The YOUTUBE_API_KEY environment variable
# overrides this value. Without a key every analysis is synthetic.
# api_key = "AIza..."

# Base URL of the API
base_url = "https://www.googleapis.com/youtube/v3"

# Per-call timeout in seconds
timeout_secs = 5

# Recent uploads listed per channel (1-50)
recent_video_count = 10

# Months covered by the monthly series, current month included (0 = no limit)
monthly_window_months = 24

# Channel used to check that the API is reachable and enabled
probe_channel_id = "UC_x5XG1OV2P6uZZ5FSM9Ttw"

# Endpoint paths relative to base_url
# [youtube.endpoints]
# search = "/search"
# channels = "/channels"
# playlist_items = "/playlistItems"
# videos = "/videos"

[synthetic]
# "seeded": the same input always produces the same numbers
# "cosmetic-random": numbers vary between runs (the tier does not)
mode = "seeded"
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.daemon
            .bind_address
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid bind_address: {}", self.daemon.bind_address))?;

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.daemon.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.daemon.log_level,
                valid_log_levels.join(", ")
            );
        }

        let base_url = &self.youtube.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("youtube.base_url must be an http(s) URL: {}", base_url);
        }

        if self.youtube.timeout_secs == 0 {
            anyhow::bail!("youtube.timeout_secs must be greater than 0");
        }

        if self.youtube.probe_channel_id.trim().is_empty() {
            anyhow::bail!("youtube.probe_channel_id must not be empty");
        }

        Ok(())
    }
}
