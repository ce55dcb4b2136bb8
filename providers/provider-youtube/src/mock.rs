//! In-memory [`Transport`] for tests and offline development.
//!
//! Routes are matched in the order they were added: a route matches when the
//! endpoint is equal and every query parameter it names is present with the
//! same value. Every call is recorded so tests can assert which requests were
//! (or were not) made.
//!
//! ```
//! use provider_youtube::MockTransport;
//! use serde_json::json;
//!
//! let transport = MockTransport::new()
//!     .with_response("/search", &[("q", "mkbhd")], json!({ "items": [] }))
//!     .with_error("/channels", &[], 403, json!({ "error": { "message": "disabled" } }));
//! assert_eq!(transport.call_count("/search"), 0);
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use crate::api::api_error;
use crate::transport::Transport;
use crate::YouTubeError;

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Json(Value),
    ApiError { status: u16, body: Value },
    Failure(String),
}

#[derive(Debug, Clone)]
struct Route {
    endpoint: String,
    params: Vec<(String, String)>,
    reply: MockReply,
}

impl Route {
    fn matches(&self, endpoint: &str, params: &[(&str, &str)]) -> bool {
        self.endpoint == endpoint
            && self
                .params
                .iter()
                .all(|(k, v)| {
                    params
                        .iter()
                        .any(|(pk, pv)| *pk == k.as_str() && *pv == v.as_str())
                })
    }
}

/// Canned-response transport.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_route(mut self, endpoint: &str, params: &[(&str, &str)], reply: MockReply) -> Self {
        self.routes.push(Route {
            endpoint: endpoint.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reply,
        });
        self
    }

    /// Answer matching requests with a JSON body.
    pub fn with_response(self, endpoint: &str, params: &[(&str, &str)], body: Value) -> Self {
        self.with_route(endpoint, params, MockReply::Json(body))
    }

    /// Answer matching requests with an HTTP error and an API error body.
    pub fn with_error(
        self,
        endpoint: &str,
        params: &[(&str, &str)],
        status: u16,
        body: Value,
    ) -> Self {
        self.with_route(endpoint, params, MockReply::ApiError { status, body })
    }

    /// Fail matching requests as if the network call itself failed.
    pub fn with_failure(self, endpoint: &str, params: &[(&str, &str)], message: &str) -> Self {
        self.with_route(endpoint, params, MockReply::Failure(message.to_string()))
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of calls made to `endpoint`.
    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, YouTubeError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                endpoint: endpoint.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });

        let route = self
            .routes
            .iter()
            .find(|route| route.matches(endpoint, params))
            .ok_or_else(|| {
                YouTubeError::RequestFailed(format!("no mock route for {} {:?}", endpoint, params))
            })?;

        match &route.reply {
            MockReply::Json(body) => Ok(body.clone()),
            MockReply::ApiError { status, body } => Err(api_error(*status, &body.to_string())),
            MockReply::Failure(message) => Err(YouTubeError::RequestFailed(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_routes_match_in_order_on_params() {
        let transport = MockTransport::new()
            .with_response("/search", &[("q", "a")], json!({ "hit": "a" }))
            .with_response("/search", &[], json!({ "hit": "any" }));

        let a = transport.get("/search", &[("q", "a"), ("part", "snippet")]).await.unwrap();
        let b = transport.get("/search", &[("q", "b")]).await.unwrap();
        assert_eq!(a["hit"], "a");
        assert_eq!(b["hit"], "any");
        assert_eq!(transport.call_count("/search"), 2);
        assert_eq!(transport.calls()[1].param("q"), Some("b"));
    }

    #[tokio::test]
    async fn test_unmatched_and_failing_routes() {
        let transport = MockTransport::new()
            .with_failure("/videos", &[], "connection reset")
            .with_error(
                "/channels",
                &[],
                403,
                json!({ "error": { "message": "off", "errors": [{ "reason": "accessNotConfigured" }] } }),
            );

        assert!(matches!(
            transport.get("/search", &[]).await,
            Err(YouTubeError::RequestFailed(_))
        ));
        assert!(matches!(
            transport.get("/videos", &[]).await,
            Err(YouTubeError::RequestFailed(msg)) if msg == "connection reset"
        ));
        assert!(transport.get("/channels", &[]).await.unwrap_err().is_api_disabled());
    }
}
