//! Batched polling of installed filters
//!
//! Every tick sends one JSON-RPC batch with the "changes" request of each
//! registered entry and routes the i-th response to the i-th entry.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, trace, warn};

use crate::infrastructure::rpc::{extract_result, Payload, RequestManager, RequestSpec, RpcError};

/// Default time between ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Receives either a non-empty array of new results or an error
pub type UpdateCallback = Arc<dyn Fn(Result<Vec<Value>, RpcError>) + Send + Sync>;

/// Runs when the poller is reset while the entry is still registered
pub type UninstallCallback = Arc<dyn Fn() + Send + Sync>;

struct PollEntry {
    request: RequestSpec,
    id: String,
    on_update: UpdateCallback,
    on_uninstall: UninstallCallback,
}

struct PollerInner {
    manager: Arc<RequestManager>,
    entries: Mutex<Vec<PollEntry>>,
    period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for PollerInner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.abort();
        }
    }
}

/// Registry of active poll entries plus the timer that drives them
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("entries", &self.len())
            .field("period", &self.inner.period)
            .finish()
    }
}

impl Poller {
    pub fn new(manager: Arc<RequestManager>, period: Duration) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                manager,
                entries: Mutex::new(Vec::new()),
                period,
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn manager(&self) -> &Arc<RequestManager> {
        &self.inner.manager
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_polling(&self, id: &str) -> bool {
        self.inner.entries.lock().iter().any(|entry| entry.id == id)
    }

    /// Register an entry; the timer starts on first use if a tokio runtime
    /// is available
    pub fn start_polling(
        &self,
        request: RequestSpec,
        id: impl Into<String>,
        on_update: UpdateCallback,
        on_uninstall: UninstallCallback,
    ) {
        let id = id.into();
        debug!(%id, method = %request.method, "start polling");
        self.inner.entries.lock().push(PollEntry {
            request,
            id,
            on_update,
            on_uninstall,
        });
        self.ensure_timer();
    }

    /// Remove every entry with this id
    pub fn stop_polling(&self, id: &str) {
        let mut entries = self.inner.entries.lock();
        for index in (0..entries.len()).rev() {
            if entries[index].id == id {
                entries.remove(index);
            }
        }
        debug!(%id, remaining = entries.len(), "stop polling");
    }

    /// Uninstall every entry, clear the registry and restart the timer
    pub fn reset(&self) {
        let removed: Vec<PollEntry> = std::mem::take(&mut *self.inner.entries.lock());
        for entry in &removed {
            (entry.on_uninstall)();
        }
        if let Some(timer) = self.inner.timer.lock().take() {
            timer.abort();
        }
        self.ensure_timer();
    }

    /// Run one tick now
    pub async fn poll(&self) -> Result<(), RpcError> {
        self.inner.poll().await
    }

    fn ensure_timer(&self) {
        let mut timer = self.inner.timer.lock();
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime; poll ticks must be driven manually");
            return;
        };
        let weak = Arc::downgrade(&self.inner);
        *timer = Some(runtime.spawn(run_timer(weak, self.inner.period)));
    }
}

async fn run_timer(inner: Weak<PollerInner>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        // each tick runs on its own task so a slow node never delays the next one
        tokio::spawn(async move {
            if let Err(err) = inner.poll().await {
                error!(%err, "poll tick failed");
            }
        });
    }
}

impl PollerInner {
    async fn poll(&self) -> Result<(), RpcError> {
        let snapshot: Vec<(String, RequestSpec, UpdateCallback)> = self
            .entries
            .lock()
            .iter()
            .map(|entry| (entry.id.clone(), entry.request.clone(), entry.on_update.clone()))
            .collect();
        if snapshot.is_empty() {
            return Ok(());
        }

        let Some(provider) = self.manager.provider() else {
            error!("{}", RpcError::ProviderNotSet);
            return Ok(());
        };

        let specs: Vec<RequestSpec> = snapshot.iter().map(|(_, spec, _)| spec.clone()).collect();
        let payload = Payload::Batch(self.manager.envelope().to_batch_payload(&specs));
        trace!(entries = specs.len(), "poll tick");

        let response = match provider.send_async(&payload).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%err, "skipping poll tick");
                return Ok(());
            }
        };

        let results = match response {
            Value::Array(results) => results,
            other => {
                error!(response = %other, "poll batch response is not an array");
                return Err(RpcError::InvalidBatchResponse(other.to_string()));
            }
        };
        if results.len() != snapshot.len() {
            warn!(
                expected = snapshot.len(),
                got = results.len(),
                "poll batch response length mismatch"
            );
        }

        // entries stopped while the batch was in flight are skipped
        let deliveries: Vec<(UpdateCallback, Value)> = {
            let entries = self.entries.lock();
            snapshot
                .into_iter()
                .zip(results)
                .filter(|((id, _, _), _)| entries.iter().any(|entry| entry.id == *id))
                .map(|((_, _, callback), result)| (callback, result))
                .collect()
        };

        for (callback, result) in deliveries {
            match extract_result(result) {
                Err(err) => callback(Err(err)),
                Ok(Value::Array(items)) if !items.is_empty() => callback(Ok(items)),
                Ok(_) => {}
            }
        }
        Ok(())
    }
}
