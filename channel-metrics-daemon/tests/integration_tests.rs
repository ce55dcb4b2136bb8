//! Integration tests for channel-metrics-daemon.
//!
//! These tests verify:
//! - JSON-RPC communication for `channels.analyze` and `channels.synthetic`
//! - Live analysis through the YouTube provider over a mock transport
//! - Synthetic fallback when the API is disabled
//! - Config file loading wired into the service
//!
//! No test touches the network: the live source always runs on `MockTransport`.


use anyhow::Result;
use channel_metrics_core::ChannelRecord;
use channel_metrics_daemon::api::handlers::ApiImpl;
use channel_metrics_daemon::api::start_server;
use channel_metrics_daemon::config::Config;
use channel_metrics_daemon::service::{AnalysisReport, AnalysisService, DataSource};
use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use jsonrpsee::server::ServerHandle;
use provider_synthetic::MagnitudeMode;
use provider_youtube::{ChannelAnalyzer, MockTransport, YouTubeClient, YouTubeConfig};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use fixtures::{ids, CHANNEL_A};

// ============================================================================
// Test Utilities
// ============================================================================

/// Builds a service whose live source runs on `transport`.
fn live_service(transport: MockTransport) -> (Arc<AnalysisService>, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let config = YouTubeConfig::default().with_api_key("test-key");
    let client = YouTubeClient::new(transport.clone(), config);
    let analyzer: Arc<dyn channel_metrics_core::ChannelSource> =
        Arc::new(ChannelAnalyzer::new(client));
    let service = AnalysisService::new(Some(analyzer), MagnitudeMode::Seeded);
    (Arc::new(service), transport)
}

/// Starts a JSON-RPC server on an ephemeral port and returns a client for it.
async fn start_test_server(service: Arc<AnalysisService>) -> Result<(HttpClient, ServerHandle)> {
    let (handle, addr) = start_server("127.0.0.1:0", service).await?;
    let client = HttpClientBuilder::default().build(format!("http://{}", addr))?;
    Ok((client, handle))
}

fn error_code(err: ClientError) -> i32 {
    match err {
        ClientError::Call(obj) => obj.code(),
        other => panic!("expected a call error, got {:?}", other),
    }
}

// ============================================================================
// Live Analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_live_batch_over_rpc() -> Result<()> {
    let (service, transport) = live_service(fixtures::healthy_transport());
    let (client, handle) = start_test_server(service).await?;

    let report: AnalysisReport = client
        .request("channels.analyze", rpc_params![ids(&["A", "B", "C"])])
        .await?;

    assert_eq!(report.source, DataSource::Live);
    assert!(report.notice.is_none());

    let titles: Vec<&str> = report.channels.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Channel A", "Channel C"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].identifier, "B");

    let a = &report.channels[0];
    assert_eq!(a.id.as_str(), CHANNEL_A);
    assert!(a.verified);
    assert_eq!(a.country, "US");
    assert_eq!(a.recent_videos.len(), 3);
    assert_eq!(a.recent_videos[0].title, "Newest");
    assert_eq!(a.recent_videos[2].view_count, 300);
    assert_eq!(a.monthly_performance.iter().map(|b| b.video_count).sum::<u64>(), 3);
    assert_eq!(a.monthly_performance.iter().map(|b| b.views).sum::<u64>(), 600);
    assert!(a
        .monthly_performance
        .windows(2)
        .all(|w| w[0].month < w[1].month));

    let c = &report.channels[1];
    assert!(!c.verified);
    assert!(c.recent_videos.is_empty());
    assert!(c.monthly_performance.is_empty());

    assert_eq!(transport.call_count("/search"), 3);

    handle.stop()?;
    Ok(())
}

#[tokio::test]
async fn test_canonical_id_skips_search() -> Result<()> {
    let (service, transport) = live_service(fixtures::healthy_transport());

    let report = service
        .analyze(&ids(&[&format!("https://www.youtube.com/channel/{}", CHANNEL_A)]))
        .await?;

    assert_eq!(report.channels.len(), 1);
    assert_eq!(report.channels[0].id.as_str(), CHANNEL_A);
    assert_eq!(transport.call_count("/search"), 0);
    Ok(())
}

// ============================================================================
// Synthetic Fallback
// ============================================================================

#[tokio::test]
async fn test_disabled_api_falls_back_to_synthetic() -> Result<()> {
    let (service, transport) = live_service(fixtures::disabled_transport());
    let (client, handle) = start_test_server(service).await?;

    let report: AnalysisReport = client
        .request("channels.analyze", rpc_params![ids(&["X", "Y"])])
        .await?;

    assert_eq!(report.source, DataSource::Synthetic);
    assert_eq!(report.channels.len(), 2);
    assert!(report.skipped.is_empty());
    assert!(report
        .notice
        .as_deref()
        .is_some_and(|n| n.contains("Enable it")));
    for channel in &report.channels {
        assert_eq!(channel.monthly_performance.len(), 24);
    }

    // Only the probe went out.
    assert_eq!(transport.calls().len(), 1);

    handle.stop()?;
    Ok(())
}

#[tokio::test]
async fn test_synthetic_method_is_deterministic() -> Result<()> {
    let service = Arc::new(AnalysisService::new(None, MagnitudeMode::Seeded));
    let (client, handle) = start_test_server(service).await?;

    let first: Vec<ChannelRecord> = client
        .request("channels.synthetic", rpc_params![ids(&["mkbhd", "veritasium"])])
        .await?;
    let second: Vec<ChannelRecord> = client
        .request("channels.synthetic", rpc_params![ids(&["mkbhd", "veritasium"])])
        .await?;

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].title, "mkbhd");
    assert_eq!(first[0].subscriber_count, second[0].subscriber_count);
    assert_eq!(first[1].view_count, second[1].view_count);

    handle.stop()?;
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_validation_errors_map_to_invalid_params() -> Result<()> {
    let (service, transport) = live_service(fixtures::healthy_transport());
    let (client, handle) = start_test_server(service).await?;

    let empty: Result<AnalysisReport, _> = client
        .request("channels.analyze", rpc_params![Vec::<String>::new()])
        .await;
    assert_eq!(error_code(empty.unwrap_err()), -32602);

    let eleven: Vec<String> = (0..11).map(|i| format!("channel{}", i)).collect();
    let too_many: Result<AnalysisReport, _> =
        client.request("channels.analyze", rpc_params![eleven]).await;
    assert_eq!(error_code(too_many.unwrap_err()), -32602);

    let blank: Result<AnalysisReport, _> = client
        .request("channels.analyze", rpc_params![ids(&["A", "  "])])
        .await;
    assert_eq!(error_code(blank.unwrap_err()), -32602);

    assert!(transport.calls().is_empty());

    handle.stop()?;
    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_config_file_wires_live_source() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"
[daemon]
bind_address = "127.0.0.1:0"
log_level = "debug"

[youtube]
api_key = "from-file"
timeout_secs = 1

[synthetic]
mode = "cosmetic-random"
"#,
    )?;

    let config = Config::load(file.path())?;
    assert_eq!(config.synthetic.mode, MagnitudeMode::CosmeticRandom);

    let service = AnalysisService::from_config(&config)?;
    assert!(service.has_live_source());
    Ok(())
}

#[tokio::test]
async fn test_rpc_module_lists_methods() {
    use channel_metrics_daemon::api::handlers::ChannelMetricsApiServer;

    let service = Arc::new(AnalysisService::new(None, MagnitudeMode::Seeded));
    let module = ApiImpl::new(service).into_rpc();
    let methods: Vec<&str> = module.method_names().collect();

    assert!(methods.contains(&"channels.analyze"));
    assert!(methods.contains(&"channels.synthetic"));
}
