//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - JSON-RPC envelope and request manager
//! - HTTP transport on reqwest
//! - Tokio-driven filter poller

pub mod rpc;
pub mod runtime;
pub mod transport;

pub use rpc::{RequestManager, RequestSpec, RpcError};
pub use runtime::Poller;
pub use transport::{HttpTransport, Transport};
