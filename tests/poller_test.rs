//! Batched polling: one batch per tick, positional delivery

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};

use common::{answer, MockTransport, MANUAL_POLL};
use ethwire::infrastructure::rpc::Payload;
use ethwire::infrastructure::runtime::{UninstallCallback, UpdateCallback};
use ethwire::{Poller, RequestManager, RequestSpec, RpcError};

type Log = Arc<Mutex<Vec<(String, Result<Vec<Value>, RpcError>)>>>;

fn recorder(log: &Log, id: &str) -> UpdateCallback {
    let log = log.clone();
    let id = id.to_string();
    Arc::new(move |update| log.lock().push((id.clone(), update)))
}

fn noop() -> UninstallCallback {
    Arc::new(|| {})
}

fn changes(id: &str) -> RequestSpec {
    RequestSpec::new("eth_getFilterChanges", vec![json!(id)])
}

fn poller_for(node: Arc<MockTransport>) -> Poller {
    Poller::new(Arc::new(RequestManager::new(Some(node))), MANUAL_POLL)
}

/// Each filter's changes are `["<id>-new"]`
fn echo_node() -> Arc<MockTransport> {
    MockTransport::answering(|request| json!([format!("{}-new", request.params[0].as_str().unwrap())]))
}

#[tokio::test]
async fn test_one_batch_per_tick_matched_by_position() {
    let node = echo_node();
    let poller = poller_for(node.clone());
    let log: Log = Arc::default();
    for id in ["a", "b", "c"] {
        poller.start_polling(changes(id), id, recorder(&log, id), noop());
    }

    poller.poll().await.unwrap();

    let sent = node.sent();
    assert_eq!(sent.len(), 1);
    let Payload::Batch(requests) = &sent[0] else {
        panic!("expected a batch");
    };
    assert_eq!(requests.len(), 3);

    let log = log.lock();
    assert_eq!(log.len(), 3);
    for (id, update) in log.iter() {
        assert_eq!(update, &Ok(vec![json!(format!("{id}-new"))]));
    }
}

#[tokio::test]
async fn test_empty_results_are_not_delivered() {
    let node = MockTransport::answering(|request| match request.params[0].as_str() {
        Some("busy") => json!(["0x01"]),
        _ => json!([]),
    });
    let poller = poller_for(node);
    let log: Log = Arc::default();
    poller.start_polling(changes("idle"), "idle", recorder(&log, "idle"), noop());
    poller.start_polling(changes("busy"), "busy", recorder(&log, "busy"), noop());

    poller.poll().await.unwrap();

    let log = log.lock();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0], ("busy".to_string(), Ok(vec![json!("0x01")])));
}

#[tokio::test]
async fn test_invalid_entry_gets_error() {
    let node = MockTransport::new(|payload| {
        let Payload::Batch(requests) = payload else {
            unreachable!("batch expected");
        };
        Ok(json!([
            { "jsonrpc": "2.0", "id": requests[0].id, "error": { "message": "filter not found" } },
            { "jsonrpc": "2.0", "id": requests[1].id, "result": ["0x02"] },
        ]))
    });
    let poller = poller_for(node);
    let log: Log = Arc::default();
    poller.start_polling(changes("gone"), "gone", recorder(&log, "gone"), noop());
    poller.start_polling(changes("live"), "live", recorder(&log, "live"), noop());

    poller.poll().await.unwrap();

    let log = log.lock();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[0],
        ("gone".to_string(), Err(RpcError::InvalidResponse("filter not found".into())))
    );
    assert_eq!(log[1], ("live".to_string(), Ok(vec![json!("0x02")])));
}

#[tokio::test]
async fn test_transport_error_skips_tick() {
    let node = MockTransport::new(|_| Err(RpcError::Connection("down".into())));
    let poller = poller_for(node.clone());
    let log: Log = Arc::default();
    poller.start_polling(changes("a"), "a", recorder(&log, "a"), noop());

    assert_eq!(poller.poll().await, Ok(()));
    assert!(log.lock().is_empty());
    assert_eq!(node.sent().len(), 1);
}

#[tokio::test]
async fn test_non_array_batch_reply_is_an_error() {
    let node = MockTransport::new(|_| Ok(json!({ "jsonrpc": "2.0", "id": 1, "result": [] })));
    let poller = poller_for(node);
    poller.start_polling(changes("a"), "a", recorder(&Log::default(), "a"), noop());

    assert!(matches!(
        poller.poll().await,
        Err(RpcError::InvalidBatchResponse(_))
    ));
}

#[tokio::test]
async fn test_no_request_without_entries_or_provider() {
    let node = echo_node();
    let poller = poller_for(node.clone());
    poller.poll().await.unwrap();
    assert!(node.sent().is_empty());

    let detached = Poller::new(Arc::new(RequestManager::new(None)), MANUAL_POLL);
    detached.start_polling(changes("a"), "a", recorder(&Log::default(), "a"), noop());
    assert_eq!(detached.poll().await, Ok(()));
}

#[tokio::test]
async fn test_entry_stopped_mid_flight_is_skipped() {
    let slot: Arc<OnceLock<Poller>> = Arc::default();
    let node = {
        let slot = slot.clone();
        MockTransport::new(move |payload| {
            // the response arrives after "b" was stopped
            if let Some(poller) = slot.get() {
                poller.stop_polling("b");
            }
            Ok(answer(payload, &|request| json!([request.params[0].clone()])))
        })
    };
    let poller = poller_for(node);
    let _ = slot.set(poller.clone());

    let log: Log = Arc::default();
    for id in ["a", "b", "c"] {
        poller.start_polling(changes(id), id, recorder(&log, id), noop());
    }
    poller.poll().await.unwrap();

    let ids: Vec<String> = log.lock().iter().map(|(id, _)| id.clone()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert!(!poller.is_polling("b"));
}

#[tokio::test]
async fn test_stop_removes_every_entry_with_the_id() {
    let poller = poller_for(echo_node());
    let log: Log = Arc::default();
    poller.start_polling(changes("x"), "x", recorder(&log, "x"), noop());
    poller.start_polling(changes("y"), "y", recorder(&log, "y"), noop());
    poller.start_polling(changes("x"), "x", recorder(&log, "x"), noop());

    poller.stop_polling("x");
    assert_eq!(poller.len(), 1);
    assert!(poller.is_polling("y"));
}

#[tokio::test]
async fn test_reset_runs_uninstall_hooks() {
    let poller = poller_for(echo_node());
    let uninstalled = Arc::new(Mutex::new(Vec::new()));
    for id in ["a", "b"] {
        let uninstalled = uninstalled.clone();
        let hook: UninstallCallback = Arc::new(move || uninstalled.lock().push(id));
        poller.start_polling(changes(id), id, recorder(&Log::default(), id), hook);
    }

    poller.reset();

    assert!(poller.is_empty());
    assert_eq!(*uninstalled.lock(), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_timer_keeps_ticking_after_failed_ticks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let node = {
        let calls = calls.clone();
        MockTransport::new(move |payload| match calls.fetch_add(1, Ordering::SeqCst) {
            0 => Err(RpcError::Connection("down".into())),
            1 => Ok(json!({ "unexpected": true })),
            _ => Ok(answer(payload, &|request| json!([request.params[0].clone()]))),
        })
    };
    let period = Duration::from_millis(100);
    let poller = Poller::new(Arc::new(RequestManager::new(Some(node.clone()))), period);
    let log: Log = Arc::default();
    poller.start_polling(changes("a"), "a", recorder(&log, "a"), noop());

    // ticks at 100ms, 200ms and 300ms
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(node.sent().len(), 3);
    assert_eq!(*log.lock(), vec![("a".to_string(), Ok(vec![json!("a")]))]);

    // reset at 350ms replaces the timer: next tick at 450ms, not 400ms
    poller.reset();
    poller.start_polling(changes("b"), "b", recorder(&log, "b"), noop());
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(node.sent().len(), 3);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(node.sent().len(), 4);
    assert_eq!(log.lock().last(), Some(&("b".to_string(), Ok(vec![json!("b")]))));
}
