//! Transport executor.
//!
//! One outbound request in, one raw response out. No retries, no per-call
//! timeout: the shared client's configuration is all there is.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

use super::error::{DispatchError, DispatchResult};
use super::request::OutboundRequest;

/// Status code and body bytes of a completed round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs a single HTTP round trip.
///
/// Implementations must be safe to share across concurrent invocations.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> DispatchResult<RawResponse>;
}

/// Executor backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    /// Wrap an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with an optional client-wide timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> DispatchResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            DispatchError::request_construction(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self::new(client))
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: OutboundRequest) -> DispatchResult<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                DispatchError::request_construction(e.to_string())
            } else {
                DispatchError::transport(describe_transport_error(&e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| DispatchError::response_decode(describe_transport_error(&e)))?;

        debug!("Response received: status {}, {} bytes", status, body.len());

        Ok(RawResponse { status, body })
    }
}
