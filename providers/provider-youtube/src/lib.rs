//! # provider-youtube
//!
//! Channel acquisition layer built on the YouTube Data API v3.
//!
//! Given a batch of free-form channel identifiers, this crate:
//!
//! - **Probes** the API once to make sure the configured key can use it
//! - **Resolves** handles, names and URLs to canonical channel IDs
//! - **Fetches** channel snippet/statistics/branding data
//! - **Lists** the most recent uploads joined with their statistics
//! - **Aggregates** up to one page of uploads into monthly buckets
//!
//! The [`ChannelAnalyzer`] sequences these steps per identifier. Only the
//! "API disabled/misconfigured" condition aborts a batch; everything else
//! degrades to a skipped identifier or an empty sub-resource.
//!
//! ## Transport
//!
//! All remote calls go through the [`Transport`] trait. [`HttpTransport`]
//! talks to the real API with a per-call timeout; [`MockTransport`] serves
//! canned payloads for tests.
//!
//! ## API Reference
//!
//! - [YouTube Data API v3](https://developers.google.com/youtube/v3)

use channel_metrics_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod analyzer;
mod api;
mod client;
pub mod mock;
pub mod monthly;
mod transport;

pub use analyzer::{BatchState, ChannelAnalyzer};
pub use client::YouTubeClient;
pub use mock::{MockTransport, RecordedCall};
pub use monthly::{aggregate_monthly, window_start};
pub use transport::{HttpTransport, Transport};

// ============================================================================
// Error Types
// ============================================================================

/// Error reasons that mean the API is disabled or the key is misconfigured.
pub const DISABLED_REASONS: [&str; 4] = [
    "accessNotConfigured",
    "SERVICE_DISABLED",
    "keyInvalid",
    "API_KEY_INVALID",
];

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("YouTube API error (status {status}): {message}")]
    ApiError {
        status: u16,
        reasons: Vec<String>,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Channel not found: {0}")]
    NotFound(String),

    #[error("No YouTube API key configured")]
    MissingApiKey,
}

impl YouTubeError {
    /// Whether the error payload carries the "API disabled/misconfigured" signature.
    ///
    /// Decided from the reason codes only; a 403 for any other reason (quota,
    /// forbidden channel) does not match.
    pub fn is_api_disabled(&self) -> bool {
        match self {
            YouTubeError::ApiError { reasons, .. } => reasons
                .iter()
                .any(|reason| DISABLED_REASONS.contains(&reason.as_str())),
            YouTubeError::MissingApiKey => true,
            _ => false,
        }
    }

    fn remediation(&self) -> String {
        match self {
            YouTubeError::MissingApiKey => {
                "No YouTube API key is configured. Set youtube.api_key in the config file \
                 or the YOUTUBE_API_KEY environment variable."
                    .to_string()
            }
            YouTubeError::ApiError { reasons, message, .. }
                if reasons
                    .iter()
                    .any(|r| r == "keyInvalid" || r == "API_KEY_INVALID") =>
            {
                format!(
                    "The configured YouTube API key was rejected ({}). \
                     Check the key in the Google Cloud console.",
                    message
                )
            }
            other => format!(
                "YouTube Data API v3 is not enabled for the configured API key ({}). \
                 Enable it under APIs & Services > Library in the Google Cloud console.",
                other
            ),
        }
    }

    /// Classify a failed availability probe. Any probe failure aborts the batch.
    pub fn into_probe_failure(self) -> AnalysisError {
        if self.is_api_disabled() {
            AnalysisError::ApiUnavailable(self.remediation())
        } else {
            AnalysisError::ApiUnavailable(format!("YouTube API is unreachable: {}", self))
        }
    }
}

impl From<YouTubeError> for AnalysisError {
    fn from(err: YouTubeError) -> Self {
        if err.is_api_disabled() {
            return AnalysisError::ApiUnavailable(err.remediation());
        }
        match err {
            YouTubeError::NotFound(e) => AnalysisError::NotFound(e),
            other => AnalysisError::TransientFetchFailure(other.to_string()),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Endpoint paths, relative to [`YouTubeConfig::base_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub search: String,
    pub channels: String,
    pub playlist_items: String,
    pub videos: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            search: "/search".to_string(),
            channels: "/channels".to_string(),
            playlist_items: "/playlistItems".to_string(),
            videos: "/videos".to_string(),
        }
    }
}

/// Settings for talking to the YouTube Data API.
///
/// Built once at startup and handed to [`YouTubeClient`]; nothing in this
/// crate reads the key from the environment.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Number of recent uploads listed per channel (1..=50)
    pub recent_video_count: u32,
    /// Months covered by the monthly series, current month included. 0 disables the window.
    pub monthly_window_months: u32,
    /// Channel used for the availability probe
    pub probe_channel_id: String,
    pub endpoints: ApiEndpoints,
}

impl YouTubeConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com/youtube/v3";

    /// Single-page maximum of the list endpoints.
    pub const MAX_PAGE_SIZE: u32 = 50;

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// `recent_video_count` clamped to what one page can return.
    pub fn recent_video_limit(&self) -> u32 {
        self.recent_video_count.clamp(1, Self::MAX_PAGE_SIZE)
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 5,
            recent_video_count: 10,
            monthly_window_months: 24,
            probe_channel_id: "UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string(),
            endpoints: ApiEndpoints::default(),
        }
    }
}

impl fmt::Debug for YouTubeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("recent_video_count", &self.recent_video_count)
            .field("monthly_window_months", &self.monthly_window_months)
            .field("probe_channel_id", &self.probe_channel_id)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
