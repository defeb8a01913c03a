//! Several prepared calls sent as one JSON-RPC batch

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::method::{Method, PreparedRequest};
use crate::infrastructure::rpc::{extract_result, RequestManager, RequestSpec, RpcError};

type Result<T> = std::result::Result<T, RpcError>;

/// Collects requests; [`Batch::execute`] sends them together and returns
/// one result per request, in the order they were added
#[derive(Debug)]
pub struct Batch {
    manager: Arc<RequestManager>,
    requests: Vec<PreparedRequest>,
}

impl Batch {
    pub fn new(manager: Arc<RequestManager>) -> Self {
        Self {
            manager,
            requests: Vec::new(),
        }
    }

    pub fn add(&mut self, request: PreparedRequest) -> &mut Self {
        self.requests.push(request);
        self
    }

    /// Prepare `method` with `args` and queue it
    pub fn add_call(&mut self, method: &Method, args: Vec<Value>) -> Result<&mut Self> {
        let request = method.request(args)?;
        Ok(self.add(request))
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Send everything queued; per-request failures are reported in place
    pub async fn execute(self) -> Result<Vec<Result<Value>>> {
        if self.requests.is_empty() {
            return Ok(Vec::new());
        }
        let specs: Vec<RequestSpec> = self.requests.iter().map(|r| r.spec.clone()).collect();
        let responses = self.manager.send_batch(&specs).await?;
        if responses.len() != self.requests.len() {
            warn!(
                expected = self.requests.len(),
                got = responses.len(),
                "batch response length mismatch"
            );
        }

        let mut responses = responses.into_iter();
        Ok(self
            .requests
            .iter()
            .map(|request| match responses.next() {
                Some(response) => {
                    extract_result(response).and_then(|result| request.format_output(result))
                }
                None => Err(RpcError::InvalidResponse(format!(
                    "no response for {}",
                    request.spec.method
                ))),
            })
            .collect())
    }
}
