//! Transport seam between the client and the remote API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::api::api_error;
use crate::{YouTubeConfig, YouTubeError};

/// Issues GET calls against the YouTube Data API.
///
/// `endpoint` is a path such as `/channels`; `params` are the query
/// parameters of the call, excluding the API key.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, YouTubeError>;
}

/// Transport backed by `reqwest` with a per-call timeout.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Build a transport from the configured key, base URL and timeout.
    pub fn new(config: &YouTubeConfig) -> Result<Self, YouTubeError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(YouTubeError::MissingApiKey)?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// The request URL carries the key as a query parameter; never keep it.
fn redacted(err: reqwest::Error) -> YouTubeError {
    YouTubeError::HttpError(err.without_url())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, YouTubeError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("YouTube API request: {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(redacted)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &error_text));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| YouTubeError::ParseError(e.without_url().to_string()))?;

        if body.get("error").is_some() {
            return Err(api_error(status.as_u16(), &body.to_string()));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_requires_api_key() {
        let config = YouTubeConfig::default();
        assert!(matches!(
            HttpTransport::new(&config),
            Err(YouTubeError::MissingApiKey)
        ));

        let config = YouTubeConfig::default().with_api_key("   ");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(YouTubeError::MissingApiKey)
        ));
    }

    #[test]
    fn test_transport_trims_base_url() {
        let mut config = YouTubeConfig::default().with_api_key("test-key");
        config.base_url = "http://localhost:8080/youtube/v3/".to_string();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url, "http://localhost:8080/youtube/v3");
        assert_eq!(transport.api_key, "test-key");
    }

    #[tokio::test]
    async fn test_connection_errors_do_not_expose_key() {
        let mut config = YouTubeConfig::default().with_api_key("SECRET-KEY-123");
        config.base_url = "http://127.0.0.1:1/youtube/v3".to_string();
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport
            .get("/channels", &[("part", "id")])
            .await
            .unwrap_err();
        assert!(matches!(err, YouTubeError::HttpError(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));

        let failure = err.into_probe_failure();
        assert!(failure.is_api_unavailable());
        assert!(!failure.to_string().contains("SECRET-KEY-123"));
    }
}
