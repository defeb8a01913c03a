//! Transport abstraction: deliver a JSON payload, return the raw JSON reply
//!
//! Transports only frame and deliver. JSON-RPC validation happens in
//! [`crate::infrastructure::rpc`].

mod http;

pub use http::{HttpTransport, DEFAULT_RPC_URL};

use serde_json::Value;

use crate::infrastructure::rpc::{Payload, RpcError};

/// Delivery of JSON-RPC payloads to a node
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Blocking send; fails with [`RpcError::Connection`] when unreachable
    fn send(&self, payload: &Payload) -> Result<Value, RpcError>;

    /// Non-blocking send
    async fn send_async(&self, payload: &Payload) -> Result<Value, RpcError>;

    /// Display name of the endpoint
    fn endpoint_name(&self) -> String;
}
