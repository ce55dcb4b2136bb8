//! JSON-RPC server implementation for channel-metrics-daemon.
//!
//! This module provides the server that listens on TCP and handles incoming
//! JSON-RPC requests from clients.

use anyhow::{Context, Result};
use jsonrpsee::server::{Server, ServerHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use super::handlers::{ApiImpl, ChannelMetricsApiServer};
use crate::service::AnalysisService;

/// Start the JSON-RPC API server on `bind_address`.
///
/// Returns the handle that keeps the server running together with the bound
/// address (useful when binding to port 0).
pub async fn start_server(
    bind_address: &str,
    service: Arc<AnalysisService>,
) -> Result<(ServerHandle, SocketAddr)> {
    info!("Starting JSON-RPC server on {}", bind_address);

    let server = Server::builder()
        .build(bind_address)
        .await
        .with_context(|| format!("Failed to build JSON-RPC server on {}", bind_address))?;

    let addr = server
        .local_addr()
        .context("Failed to get server address")?;
    info!("JSON-RPC server listening on {}", addr);

    let handle = server.start(ApiImpl::new(service).into_rpc());

    Ok((handle, addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_synthetic::MagnitudeMode;

    #[tokio::test]
    async fn test_server_starts_on_ephemeral_port() {
        let service = Arc::new(AnalysisService::new(None, MagnitudeMode::Seeded));
        let (handle, addr) = start_server("127.0.0.1:0", service).await.unwrap();
        assert_ne!(addr.port(), 0);
        handle.stop().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_bind_address() {
        let service = Arc::new(AnalysisService::new(None, MagnitudeMode::Seeded));
        assert!(start_server("not-an-address", service).await.is_err());
    }
}
