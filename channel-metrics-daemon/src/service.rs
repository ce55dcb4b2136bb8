//! Live analysis with synthetic fallback.
//!
//! The daemon never hands an empty dashboard back to a client because the
//! YouTube API is switched off: when the live source reports
//! [`AnalysisError::ApiUnavailable`], or no key is configured at all, every
//! identifier of the batch is answered with a synthetic record instead and
//! the report says so.

use channel_metrics_core::prelude::*;
use provider_synthetic::{MagnitudeMode, SyntheticProvider};
use provider_youtube::ChannelAnalyzer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;

/// Notice attached to reports produced without a configured key.
pub const NO_KEY_NOTICE: &str =
    "No YouTube API key is configured; showing synthetic data. Set YOUTUBE_API_KEY to fetch live data.";

/// Where the records of a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Synthetic,
}

/// Result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: DataSource,
    pub channels: Vec<ChannelRecord>,
    pub skipped: Vec<SkippedIdentifier>,
    /// Why synthetic data was served, for display to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

pub struct AnalysisService {
    live: Option<Arc<dyn ChannelSource>>,
    synthetic: SyntheticProvider,
}

impl AnalysisService {
    pub fn new(live: Option<Arc<dyn ChannelSource>>, mode: MagnitudeMode) -> Self {
        Self {
            live,
            synthetic: SyntheticProvider::new(mode),
        }
    }

    /// Wire the live YouTube source when a key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let live: Option<Arc<dyn ChannelSource>> = if config.youtube.has_api_key() {
            let analyzer = ChannelAnalyzer::from_config(config.youtube.clone())?;
            info!("Live source enabled: {}", analyzer.name());
            Some(Arc::new(analyzer))
        } else {
            warn!("No YouTube API key configured; all analyses will be synthetic");
            None
        };

        Ok(Self::new(live, config.synthetic.mode))
    }

    pub fn has_live_source(&self) -> bool {
        self.live.is_some()
    }

    /// Analyze a batch, falling back to synthetic records when the API is unusable.
    ///
    /// Validation failures are returned as-is and never trigger the fallback.
    pub async fn analyze(&self, identifiers: &[String]) -> Result<AnalysisReport> {
        validate_identifiers(identifiers)?;

        let Some(live) = &self.live else {
            return Ok(self.synthetic_report(identifiers, NO_KEY_NOTICE.to_string()));
        };

        match live.analyze(identifiers).await {
            Ok(report) => Ok(AnalysisReport {
                source: DataSource::Live,
                channels: report.channels,
                skipped: report.skipped,
                notice: None,
            }),
            Err(AnalysisError::ApiUnavailable(reason)) => {
                warn!("Live source unavailable, serving synthetic data: {}", reason);
                Ok(self.synthetic_report(identifiers, reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Synthetic records for up to [`MAX_IDENTIFIERS`] identifiers. Never fails.
    ///
    /// Identifiers past the limit are dropped.
    pub fn synthetic(&self, identifiers: &[String]) -> Vec<ChannelRecord> {
        if identifiers.len() > MAX_IDENTIFIERS {
            warn!(
                "Synthetic request for {} identifiers truncated to {}",
                identifiers.len(),
                MAX_IDENTIFIERS
            );
        }
        let capped = &identifiers[..identifiers.len().min(MAX_IDENTIFIERS)];
        self.synthetic.generator().generate_all(capped)
    }

    fn synthetic_report(&self, identifiers: &[String], notice: String) -> AnalysisReport {
        AnalysisReport {
            source: DataSource::Synthetic,
            channels: self.synthetic(identifiers),
            skipped: vec![],
            notice: Some(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Live source stub that always returns the same outcome.
    struct StubSource {
        outcome: Result<BatchReport>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(outcome: Result<BatchReport>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ChannelSource for StubSource {
        fn id(&self) -> &'static str {
            "stub"
        }

        fn name(&self) -> &'static str {
            "Stub"
        }

        async fn analyze(&self, _identifiers: &[String]) -> Result<BatchReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn service_with(live: Arc<StubSource>) -> AnalysisService {
        let live: Arc<dyn ChannelSource> = live;
        AnalysisService::new(Some(live), MagnitudeMode::Seeded)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_live_report_passes_through() {
        let live = StubSource::new(Ok(BatchReport {
            channels: vec![],
            skipped: vec![SkippedIdentifier {
                identifier: "B".to_string(),
                reason: "Channel not found: B".to_string(),
            }],
        }));
        let service = service_with(live.clone());

        let report = service.analyze(&ids(&["B"])).await.unwrap();
        assert_eq!(report.source, DataSource::Live);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.notice.is_none());
        assert_eq!(live.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_api_falls_back_for_every_identifier() {
        let live = StubSource::new(Err(AnalysisError::ApiUnavailable(
            "YouTube Data API v3 is disabled".to_string(),
        )));
        let service = service_with(live);

        let report = service.analyze(&ids(&["X", "Y"])).await.unwrap();
        assert_eq!(report.source, DataSource::Synthetic);
        assert_eq!(report.channels.len(), 2);
        assert_eq!(report.channels[0].title, "X");
        assert_eq!(report.channels[1].title, "Y");
        assert_eq!(report.notice.as_deref(), Some("YouTube Data API v3 is disabled"));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_masked() {
        let live = StubSource::new(Err(AnalysisError::TransientFetchFailure("boom".to_string())));
        let service = service_with(live);

        let err = service.analyze(&ids(&["X"])).await.unwrap_err();
        assert_eq!(err, AnalysisError::TransientFetchFailure("boom".to_string()));
    }

    #[tokio::test]
    async fn test_validation_runs_before_live_source() {
        let live = StubSource::new(Ok(BatchReport::default()));
        let service = service_with(live.clone());

        let err = service.analyze(&[]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));

        let too_many: Vec<String> = (0..MAX_IDENTIFIERS + 1).map(|i| format!("c{}", i)).collect();
        assert!(matches!(
            service.analyze(&too_many).await,
            Err(AnalysisError::Validation(_))
        ));
        assert_eq!(live.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_key_serves_synthetic() {
        let service = AnalysisService::from_config(&Config::default()).unwrap();
        assert!(!service.has_live_source());

        let report = service.analyze(&ids(&["mkbhd"])).await.unwrap();
        assert_eq!(report.source, DataSource::Synthetic);
        assert_eq!(report.notice.as_deref(), Some(NO_KEY_NOTICE));
        assert_eq!(report.channels.len(), 1);
    }

    #[test]
    fn test_synthetic_is_capped() {
        let service = AnalysisService::new(None, MagnitudeMode::Seeded);
        let batch: Vec<String> = (0..MAX_IDENTIFIERS + 5).map(|i| format!("c{}", i)).collect();

        let records = service.synthetic(&batch);
        assert_eq!(records.len(), MAX_IDENTIFIERS);
        assert_eq!(records[0].title, "c0");
        assert!(service.synthetic(&[]).is_empty());
    }

    #[test]
    fn test_report_serialization() {
        let report = AnalysisReport {
            source: DataSource::Synthetic,
            channels: vec![],
            skipped: vec![],
            notice: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "synthetic");
        assert!(json.get("notice").is_none());
    }
}
