//! JSON-RPC 2.0 request builder and response validation

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::error::{Result, RpcError};

pub const JSONRPC_VERSION: &str = "2.0";

/// A method name and its already-formatted parameters, not yet numbered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: String,
    pub params: Vec<Value>,
}

impl RequestSpec {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// One JSON-RPC request object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

/// What a transport puts on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Single(JsonRpcRequest),
    Batch(Vec<JsonRpcRequest>),
}

/// Numbers requests for one client; ids start at 1 and grow by 1
#[derive(Debug)]
pub struct Envelope {
    next_id: AtomicU64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    pub fn to_payload(&self, spec: &RequestSpec) -> JsonRpcRequest {
        if spec.method.is_empty() {
            warn!("building JSON-RPC request with an empty method name");
        }
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: spec.method.clone(),
            params: spec.params.clone(),
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn to_batch_payload(&self, specs: &[RequestSpec]) -> Vec<JsonRpcRequest> {
        specs.iter().map(|spec| self.to_payload(spec)).collect()
    }
}

/// Valid iff no `error`, version `2.0`, numeric id and a `result` key
/// (a `null` result is valid, a missing one is not)
pub fn is_valid_response(response: &Value) -> bool {
    let Some(object) = response.as_object() else {
        return false;
    };
    !object.contains_key("error")
        && object.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
        && object.get("id").is_some_and(Value::is_number)
        && object.contains_key("result")
}

/// Validate and take `.result`
pub fn extract_result(response: Value) -> Result<Value> {
    if !is_valid_response(&response) {
        return Err(RpcError::invalid_response(&response));
    }
    match response {
        Value::Object(mut object) => Ok(object.remove("result").unwrap_or(Value::Null)),
        other => Err(RpcError::invalid_response(&other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let envelope = Envelope::new();
        let spec = RequestSpec::new("eth_blockNumber", vec![]);
        let ids: Vec<u64> = (0..4).map(|_| envelope.to_payload(&spec).id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_payload_shape() {
        let envelope = Envelope::new();
        let request = envelope.to_payload(&RequestSpec::new("eth_getBalance", vec![json!("0x1")]));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "method": "eth_getBalance", "params": ["0x1"], "id": 1})
        );
    }

    #[test]
    fn test_batch_serializes_as_array() {
        let envelope = Envelope::new();
        let batch = envelope.to_batch_payload(&[
            RequestSpec::new("eth_blockNumber", vec![]),
            RequestSpec::new("net_version", vec![]),
        ]);
        let value = serde_json::to_value(Payload::Batch(batch)).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[1]["id"], 2);
    }

    #[test]
    fn test_validity_boundary() {
        assert!(is_valid_response(&json!({"jsonrpc": "2.0", "id": 1, "result": null})));
        assert!(!is_valid_response(&json!({"jsonrpc": "2.0", "id": 1})));
        assert!(!is_valid_response(
            &json!({"jsonrpc": "2.0", "id": 1, "error": {"message": "x"}, "result": "y"})
        ));
        assert!(!is_valid_response(&json!({"jsonrpc": "1.0", "id": 1, "result": 1})));
        assert!(!is_valid_response(&json!({"jsonrpc": "2.0", "id": "1", "result": 1})));
        assert!(!is_valid_response(&Value::Null));
    }

    #[test]
    fn test_extract_result_carries_node_message() {
        let err = extract_result(json!({"jsonrpc": "2.0", "id": 1, "error": {"message": "boom"}}))
            .unwrap_err();
        assert_eq!(err, RpcError::InvalidResponse("boom".into()));
    }
}
