//! JSON-RPC plumbing: envelope, errors and the request manager

mod envelope;
mod error;
mod manager;

pub use envelope::{
    extract_result, is_valid_response, Envelope, JsonRpcRequest, Payload, RequestSpec,
    JSONRPC_VERSION,
};
pub use error::{Result, RpcError};
pub use manager::RequestManager;
