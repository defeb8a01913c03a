//! HTTP POST transport on reqwest

use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;
use tracing::trace;

use super::Transport;
use crate::infrastructure::rpc::{Payload, RpcError};

/// Node URL used when nothing is configured
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC over HTTP POST.
///
/// The blocking client is built on first use of [`Transport::send`];
/// reqwest does not allow that path from inside an async context.
#[derive(Debug)]
pub struct HttpTransport {
    url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
    blocking: OnceLock<reqwest::blocking::Client>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_URL)
    }
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            client: reqwest::Client::new(),
            blocking: OnceLock::new(),
        }
    }

    /// Apply a per-request timeout to both clients
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RpcError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, RpcError> {
        if let Some(client) = self.blocking.get() {
            return Ok(client);
        }
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(self.blocking.get_or_init(|| client))
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    fn send(&self, payload: &Payload) -> Result<Value, RpcError> {
        trace!(url = %self.url, "sending blocking request");
        let response = self
            .blocking_client()?
            .post(&self.url)
            .json(payload)
            .send()?
            .error_for_status()?;
        Ok(response.json::<Value>()?)
    }

    async fn send_async(&self, payload: &Payload) -> Result<Value, RpcError> {
        trace!(url = %self.url, "sending request");
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    fn endpoint_name(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        assert_eq!(HttpTransport::default().url(), "http://localhost:8545");
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let transport = HttpTransport::new("http://127.0.0.1:1");
        let payload = Payload::Batch(vec![]);
        let err = transport.send_async(&payload).await.unwrap_err();
        assert!(matches!(err, RpcError::Connection(_)));
    }
}
