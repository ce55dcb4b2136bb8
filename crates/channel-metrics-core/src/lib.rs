//! # channel-metrics-core
//!
//! Core types shared by every channel-metrics component.
//!
//! This crate defines the data that flows out of the acquisition layer and
//! the contract that data sources implement:
//!
//! - [`ChannelRecord`] - One analyzed channel (statistics, recent uploads, monthly series)
//! - [`VideoRecord`] - A single upload with its view/like/comment counts
//! - [`MonthlyBucket`] - Uploads and views rolled up per `YYYY-MM` month
//! - [`AnalysisError`] - The error taxonomy that drives skip/abort/fallback decisions
//! - [`ChannelSource`] - Trait implemented by the live and synthetic sources

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod identifier;

pub use identifier::{clean_identifier, is_canonical_id};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The remote API rejects calls as disabled or misconfigured. Fatal for a batch.
    #[error("API unavailable: {0}")]
    ApiUnavailable(String),

    /// A single identifier could not be resolved to a channel.
    #[error("Channel not found: {0}")]
    NotFound(String),

    /// Network or decode failure on a sub-fetch.
    #[error("Fetch failed: {0}")]
    TransientFetchFailure(String),

    /// The request was rejected before any network call.
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl AnalysisError {
    /// Whether this error must abort the whole batch.
    pub fn is_api_unavailable(&self) -> bool {
        matches!(self, AnalysisError::ApiUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of identifiers accepted in one batch.
pub const MAX_IDENTIFIERS: usize = 10;

/// Channels with more subscribers than this are flagged as verified.
pub const VERIFIED_SUBSCRIBER_THRESHOLD: u64 = 100_000;

pub fn is_verified(subscriber_count: u64) -> bool {
    subscriber_count > VERIFIED_SUBSCRIBER_THRESHOLD
}

/// Reject empty or oversized batches before any work is done.
pub fn validate_identifiers(identifiers: &[String]) -> Result<()> {
    if identifiers.is_empty() {
        return Err(AnalysisError::Validation(
            "at least one channel identifier is required".to_string(),
        ));
    }
    if identifiers.len() > MAX_IDENTIFIERS {
        return Err(AnalysisError::Validation(format!(
            "too many channel identifiers: {} (maximum is {})",
            identifiers.len(),
            MAX_IDENTIFIERS
        )));
    }
    if let Some(position) = identifiers.iter().position(|id| id.trim().is_empty()) {
        return Err(AnalysisError::Validation(format!(
            "channel identifier #{} is blank",
            position + 1
        )));
    }
    Ok(())
}

// ============================================================================
// Core ID Types
// ============================================================================

/// Canonical channel identifier as issued by the platform (e.g. `UCxxxxxxxxxxxxxxxxxxxxxx`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_canonical(&self) -> bool {
        is_canonical_id(&self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Records
// ============================================================================

/// A single upload with its engagement counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "published")]
    pub published_at: DateTime<Utc>,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "views")]
    pub view_count: u64,
    #[serde(rename = "likes")]
    pub like_count: u64,
    #[serde(rename = "comments")]
    pub comment_count: u64,
}

/// Uploads and views for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// `YYYY-MM`, sorts lexicographically in calendar order.
    pub month: String,
    pub video_count: u64,
    pub views: u64,
}

impl MonthlyBucket {
    pub fn new(month: impl Into<String>, video_count: u64, views: u64) -> Self {
        Self {
            month: month.into(),
            video_count,
            views,
        }
    }

    /// Month key for a timestamp.
    pub fn key_for(timestamp: &DateTime<Utc>) -> String {
        month_key(timestamp.year(), timestamp.month())
    }
}

/// Format a `YYYY-MM` key. `month` is 1-based.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// One analyzed channel, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub title: String,
    pub description: String,
    pub custom_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
    pub country: String,
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub recent_videos: Vec<VideoRecord>,
    pub monthly_performance: Vec<MonthlyBucket>,
}

// ============================================================================
// Batch Results
// ============================================================================

/// An input identifier that produced no record, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedIdentifier {
    pub identifier: String,
    pub reason: String,
}

/// Outcome of a batch that was not aborted.
///
/// `channels` keeps the relative order of the input identifiers. Identifiers
/// listed in `skipped` produced no record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub channels: Vec<ChannelRecord>,
    pub skipped: Vec<SkippedIdentifier>,
}

impl BatchReport {
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

// ============================================================================
// Source Trait
// ============================================================================

/// A source of channel records.
///
/// Implementations process the identifiers of one batch and either return
/// the records they could produce or abort with
/// [`AnalysisError::ApiUnavailable`].
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// Unique identifier for this source (e.g., "youtube", "synthetic")
    fn id(&self) -> &'static str;

    /// Human-readable name for display
    fn name(&self) -> &'static str;

    /// Analyze a batch of raw identifiers.
    async fn analyze(&self, identifiers: &[String]) -> Result<BatchReport>;
}

// ============================================================================
// Re-exports
// ============================================================================

pub mod prelude {
    pub use crate::{
        clean_identifier, is_canonical_id, is_verified, month_key, validate_identifiers,
        AnalysisError, BatchReport, ChannelId, ChannelRecord, ChannelSource, MonthlyBucket,
        Result, SkippedIdentifier, VideoRecord, MAX_IDENTIFIERS, VERIFIED_SUBSCRIBER_THRESHOLD,
    };
}
