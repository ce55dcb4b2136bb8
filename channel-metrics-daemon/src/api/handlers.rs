//! JSON-RPC API handlers for channel-metrics-daemon.
//!
//! This module defines the RPC interface and its implementation on top of
//! [`AnalysisService`].

use channel_metrics_core::{AnalysisError, ChannelRecord};
use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::types::error::{ErrorObjectOwned, INVALID_PARAMS_CODE};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::service::{AnalysisReport, AnalysisService};

/// Error code for analysis failures other than invalid input.
pub const ANALYSIS_FAILED_CODE: i32 = -32000;

/// The JSON-RPC API interface for channel analysis.
#[rpc(server)]
pub trait ChannelMetricsApi {
    /// Analyze up to ten channels, falling back to synthetic data when the API is unusable.
    #[method(name = "channels.analyze")]
    async fn analyze_channels(&self, identifiers: Vec<String>) -> RpcResult<AnalysisReport>;

    /// Synthetic records for the given identifiers, at most ten; extra entries are ignored.
    #[method(name = "channels.synthetic")]
    async fn synthetic_channels(&self, identifiers: Vec<String>) -> RpcResult<Vec<ChannelRecord>>;
}

pub struct ApiImpl {
    service: Arc<AnalysisService>,
}

impl ApiImpl {
    pub fn new(service: Arc<AnalysisService>) -> Self {
        Self { service }
    }
}

fn rpc_error(err: AnalysisError) -> ErrorObjectOwned {
    let code = match err {
        AnalysisError::Validation(_) => INVALID_PARAMS_CODE,
        _ => ANALYSIS_FAILED_CODE,
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}

#[jsonrpsee::core::async_trait]
impl ChannelMetricsApiServer for ApiImpl {
    async fn analyze_channels(&self, identifiers: Vec<String>) -> RpcResult<AnalysisReport> {
        debug!("channels.analyze: {:?}", identifiers);
        self.service.analyze(&identifiers).await.map_err(|e| {
            warn!("channels.analyze failed: {}", e);
            rpc_error(e)
        })
    }

    async fn synthetic_channels(&self, identifiers: Vec<String>) -> RpcResult<Vec<ChannelRecord>> {
        debug!("channels.synthetic: {} identifier(s)", identifiers.len());
        Ok(self.service.synthetic(&identifiers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let err = rpc_error(AnalysisError::Validation("at least one channel identifier is required".into()));
        assert_eq!(err.code(), INVALID_PARAMS_CODE);
        assert!(err.message().contains("at least one"));
    }

    #[test]
    fn test_other_errors_map_to_server_error() {
        let err = rpc_error(AnalysisError::TransientFetchFailure("timeout".into()));
        assert_eq!(err.code(), ANALYSIS_FAILED_CODE);
    }
}
