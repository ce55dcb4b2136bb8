//! Batch orchestration over [`YouTubeClient`].

use async_trait::async_trait;
use channel_metrics_core::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

use crate::client::YouTubeClient;
use crate::{YouTubeConfig, YouTubeError};

/// Where a batch is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Probing,
    Fetching { index: usize },
    Done,
    Aborted,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Idle => write!(f, "idle"),
            BatchState::Probing => write!(f, "probing"),
            BatchState::Fetching { index } => write!(f, "fetching #{}", index),
            BatchState::Done => write!(f, "done"),
            BatchState::Aborted => write!(f, "aborted"),
        }
    }
}

impl BatchState {
    fn advance(&mut self, next: BatchState) {
        debug!("Batch state: {} -> {}", self, next);
        *self = next;
    }
}

/// Runs a batch of identifiers against the YouTube Data API.
///
/// Identifiers are processed one at a time, in input order. The probe runs
/// once before the first identifier; if it fails, or any later call carries
/// the disabled-API signature, the batch aborts with
/// [`AnalysisError::ApiUnavailable`] and no partial records. Any other
/// per-identifier failure only drops that identifier.
pub struct ChannelAnalyzer {
    client: YouTubeClient,
}

impl ChannelAnalyzer {
    pub fn new(client: YouTubeClient) -> Self {
        Self { client }
    }

    /// Build an analyzer that talks to the real API.
    pub fn from_config(config: YouTubeConfig) -> std::result::Result<Self, YouTubeError> {
        Ok(Self::new(YouTubeClient::from_config(config)?))
    }

    pub fn client(&self) -> &YouTubeClient {
        &self.client
    }

    /// Analyze a batch of raw identifiers.
    pub async fn analyze(&self, identifiers: &[String]) -> Result<BatchReport> {
        validate_identifiers(identifiers)?;

        let mut state = BatchState::Idle;
        state.advance(BatchState::Probing);

        if let Err(e) = self.client.probe().await {
            state.advance(BatchState::Aborted);
            warn!("YouTube availability probe failed: {}", e);
            return Err(e.into_probe_failure());
        }

        let mut report = BatchReport::default();
        for (index, identifier) in identifiers.iter().enumerate() {
            state.advance(BatchState::Fetching { index });

            match self.analyze_one(identifier).await {
                Ok(record) => report.channels.push(record),
                Err(e) if e.is_api_unavailable() => {
                    state.advance(BatchState::Aborted);
                    warn!("Aborting batch at {:?}: {}", identifier, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Skipping channel {:?}: {}", identifier, e);
                    report.skipped.push(SkippedIdentifier {
                        identifier: identifier.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        state.advance(BatchState::Done);
        info!(
            "Analyzed {} of {} channel(s)",
            report.channels.len(),
            identifiers.len()
        );
        Ok(report)
    }

    async fn analyze_one(&self, identifier: &str) -> Result<ChannelRecord> {
        let channel_id = self.client.resolve_channel_id(identifier).await?;
        let video_count = self.client.config().recent_video_limit();

        let (statistics, activity) = tokio::join!(
            self.client.fetch_statistics(&channel_id),
            self.client.fetch_activity(&channel_id, video_count),
        );

        let (videos, monthly) = best_effort(activity, "uploads", &channel_id)?;

        let mut record = statistics?;
        record.recent_videos = videos;
        record.monthly_performance = monthly;
        Ok(record)
    }
}

/// Degrade a failed sub-fetch to an empty value unless the API itself is unusable.
fn best_effort<T: Default>(
    result: std::result::Result<T, YouTubeError>,
    what: &str,
    channel_id: &ChannelId,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let err = AnalysisError::from(e);
            if err.is_api_unavailable() {
                return Err(err);
            }
            warn!("Failed to fetch {} for {}: {}", what, channel_id, err);
            Ok(T::default())
        }
    }
}

#[async_trait]
impl ChannelSource for ChannelAnalyzer {
    fn id(&self) -> &'static str {
        "youtube"
    }

    fn name(&self) -> &'static str {
        "YouTube Data API"
    }

    async fn analyze(&self, identifiers: &[String]) -> Result<BatchReport> {
        ChannelAnalyzer::analyze(self, identifiers).await
    }
}
