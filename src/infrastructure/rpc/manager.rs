//! Request manager: the current transport plus the request numbering

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, error};

use super::envelope::{extract_result, Envelope, Payload, RequestSpec};
use super::error::{Result, RpcError};
use crate::infrastructure::transport::Transport;

/// Sends requests through whichever transport is currently set.
///
/// The transport can be swapped at runtime (reconnecting to another node).
pub struct RequestManager {
    provider: RwLock<Option<Arc<dyn Transport>>>,
    envelope: Envelope,
}

impl std::fmt::Debug for RequestManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestManager")
            .field("provider", &self.provider.read().as_ref().map(|p| p.endpoint_name()))
            .field("envelope", &self.envelope)
            .finish()
    }
}

impl RequestManager {
    pub fn new(provider: Option<Arc<dyn Transport>>) -> Self {
        Self {
            provider: RwLock::new(provider),
            envelope: Envelope::new(),
        }
    }

    pub fn set_provider(&self, provider: Option<Arc<dyn Transport>>) {
        *self.provider.write() = provider;
    }

    pub fn provider(&self) -> Option<Arc<dyn Transport>> {
        self.provider.read().clone()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Blocking call. With no transport set this logs and yields `null`.
    pub fn send(&self, spec: &RequestSpec) -> Result<Value> {
        let Some(provider) = self.provider() else {
            error!(method = %spec.method, "{}", RpcError::ProviderNotSet);
            return Ok(Value::Null);
        };
        let payload = Payload::Single(self.envelope.to_payload(spec));
        debug!(method = %spec.method, "sending request");
        extract_result(provider.send(&payload)?)
    }

    pub async fn send_async(&self, spec: &RequestSpec) -> Result<Value> {
        let provider = self.provider().ok_or(RpcError::ProviderNotSet)?;
        self.send_async_with(provider.as_ref(), spec).await
    }

    /// Send through a given transport instead of the current one, keeping
    /// this manager's request numbering
    pub async fn send_async_with(&self, provider: &dyn Transport, spec: &RequestSpec) -> Result<Value> {
        let payload = Payload::Single(self.envelope.to_payload(spec));
        debug!(method = %spec.method, "sending request");
        extract_result(provider.send_async(&payload).await?)
    }

    /// One batch for all specs; returns the raw response objects in order.
    /// Fails if the node does not answer with an array.
    pub async fn send_batch(&self, specs: &[RequestSpec]) -> Result<Vec<Value>> {
        let provider = self.provider().ok_or(RpcError::ProviderNotSet)?;
        let payload = Payload::Batch(self.envelope.to_batch_payload(specs));
        debug!(requests = specs.len(), "sending batch");
        match provider.send_async(&payload).await? {
            Value::Array(responses) => Ok(responses),
            other => Err(RpcError::InvalidBatchResponse(other.to_string())),
        }
    }
}
