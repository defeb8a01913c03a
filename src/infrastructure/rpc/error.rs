//! Error type for the RPC layer

use thiserror::Error;

use crate::domain::abi::AbiError;

/// Errors raised while preparing, sending or reading JSON-RPC calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Formatted argument count differs from the method's declared count
    #[error("invalid number of input parameters for {method}: expected {expected}, got {got}")]
    InvalidParamCount {
        method: String,
        expected: usize,
        got: usize,
    },

    /// The transport could not deliver the payload
    #[error("connection error: {0}")]
    Connection(String),

    /// The response failed JSON-RPC shape validation
    #[error("{0}")]
    InvalidResponse(String),

    /// A batch response was not an array
    #[error("batch response is not an array: {0}")]
    InvalidBatchResponse(String),

    /// No transport configured
    #[error("provider not set or invalid")]
    ProviderNotSet,

    /// An argument formatter rejected its input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Abi(#[from] AbiError),
}

impl RpcError {
    /// Build an invalid-response error, preferring the node's own message
    pub fn invalid_response(response: &serde_json::Value) -> Self {
        let message = response
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("invalid JSON RPC response: {response}"));
        RpcError::InvalidResponse(message)
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        RpcError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::InvalidResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
