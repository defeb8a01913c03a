//! In-memory transport for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use ethwire::infrastructure::rpc::{JsonRpcRequest, Payload};
use ethwire::{Client, RpcError, Transport};

/// Long enough that the background timer never fires during a test
pub const MANUAL_POLL: Duration = Duration::from_secs(3600);

type Handler = Box<dyn Fn(&Payload) -> Result<Value, RpcError> + Send + Sync>;

/// Answers every payload through a handler and records what was sent
pub struct MockTransport {
    handler: Handler,
    sent: Mutex<Vec<Payload>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&Payload) -> Result<Value, RpcError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Answer each request with `result(request)`, singly or as a batch
    pub fn answering(result: impl Fn(&JsonRpcRequest) -> Value + Send + Sync + 'static) -> Arc<Self> {
        Self::new(move |payload| Ok(answer(payload, &result)))
    }

    pub fn sent(&self) -> Vec<Payload> {
        self.sent.lock().clone()
    }

    /// Every request sent, batches flattened, in order
    pub fn requests(&self) -> Vec<JsonRpcRequest> {
        self.sent
            .lock()
            .iter()
            .flat_map(|payload| match payload {
                Payload::Single(request) => vec![request.clone()],
                Payload::Batch(requests) => requests.clone(),
            })
            .collect()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.method).collect()
    }

    fn handle(&self, payload: &Payload) -> Result<Value, RpcError> {
        self.sent.lock().push(payload.clone());
        (self.handler)(payload)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn send(&self, payload: &Payload) -> Result<Value, RpcError> {
        self.handle(payload)
    }

    async fn send_async(&self, payload: &Payload) -> Result<Value, RpcError> {
        self.handle(payload)
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}

pub fn respond(id: u64, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

pub fn answer(payload: &Payload, result: &dyn Fn(&JsonRpcRequest) -> Value) -> Value {
    match payload {
        Payload::Single(request) => respond(request.id, result(request)),
        Payload::Batch(requests) => Value::Array(
            requests
                .iter()
                .map(|request| respond(request.id, result(request)))
                .collect(),
        ),
    }
}

pub fn client_with(transport: Arc<MockTransport>) -> Client {
    Client::new(Some(transport), MANUAL_POLL)
}
