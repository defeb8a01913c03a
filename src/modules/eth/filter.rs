//! Server-side filters with polled updates
//!
//! A [`Filter`] is installed once, then any number of watchers can attach.
//! Updates arrive through the client's [`Poller`]; every new item is fanned
//! out to every watcher.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::block::BlockRef;
use super::formatters::{input_address, output_log, to_topic};
use super::method::OutputFormatter;
use super::methods::{
    GET_FILTER_CHANGES, GET_FILTER_LOGS, NEW_BLOCK_FILTER, NEW_FILTER,
    NEW_PENDING_TRANSACTION_FILTER, UNINSTALL_FILTER,
};
use crate::infrastructure::rpc::{RequestManager, RequestSpec, RpcError};
use crate::infrastructure::runtime::{Poller, UninstallCallback, UpdateCallback};

type Result<T> = std::result::Result<T, RpcError>;

/// Receives each new item, or the error of a failed poll
pub type WatchCallback = Arc<dyn Fn(Result<Value>) + Send + Sync>;

/// Log filter criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub from_block: Option<BlockRef>,
    pub to_block: Option<BlockRef>,
    pub address: Option<String>,
    /// Positional topics; `None` matches anything
    pub topics: Vec<Option<String>>,
}

impl FilterOptions {
    /// Normalized `eth_newFilter` parameter object
    pub fn to_value(&self) -> Result<Value> {
        let mut object = Map::new();
        if let Some(from) = &self.from_block {
            object.insert("fromBlock".to_string(), from.to_value());
        }
        if let Some(to) = &self.to_block {
            object.insert("toBlock".to_string(), to.to_value());
        }
        if let Some(address) = &self.address {
            object.insert(
                "address".to_string(),
                input_address(&Value::String(address.clone()))?,
            );
        }
        let topics = self
            .topics
            .iter()
            .map(|topic| match topic {
                Some(topic) => Value::String(to_topic(topic)),
                None => Value::Null,
            })
            .collect();
        object.insert("topics".to_string(), Value::Array(topics));
        Ok(Value::Object(object))
    }
}

/// What a filter watches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// New block hashes
    Latest,
    /// New pending transaction hashes
    Pending,
    Options(FilterOptions),
}

impl From<FilterOptions> for FilterSpec {
    fn from(options: FilterOptions) -> Self {
        FilterSpec::Options(options)
    }
}

struct FilterInner {
    spec: FilterSpec,
    id: String,
    manager: Arc<RequestManager>,
    poller: Poller,
    formatter: Option<OutputFormatter>,
    callbacks: Mutex<Vec<WatchCallback>>,
}

impl FilterInner {
    fn format(&self, item: Value) -> Result<Value> {
        match self.formatter {
            Some(format) if !item.is_null() => format(item),
            _ => Ok(item),
        }
    }

    fn callbacks(&self) -> Vec<WatchCallback> {
        self.callbacks.lock().clone()
    }

    fn deliver(&self, update: Result<Vec<Value>>) {
        let callbacks = self.callbacks();
        match update {
            Ok(items) => {
                for item in items {
                    let item = self.format(item);
                    for callback in &callbacks {
                        callback(item.clone());
                    }
                }
            }
            Err(err) => {
                for callback in &callbacks {
                    callback(Err(err.clone()));
                }
            }
        }
    }
}

/// An installed filter
#[derive(Clone)]
pub struct Filter {
    inner: Arc<FilterInner>,
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("id", &self.inner.id)
            .field("spec", &self.inner.spec)
            .field("watchers", &self.inner.callbacks.lock().len())
            .finish()
    }
}

impl Filter {
    /// Install the filter on the node and keep the id it assigns
    pub async fn install(
        manager: Arc<RequestManager>,
        poller: Poller,
        spec: FilterSpec,
    ) -> Result<Self> {
        let (method, args) = match &spec {
            FilterSpec::Latest => (NEW_BLOCK_FILTER, vec![]),
            FilterSpec::Pending => (NEW_PENDING_TRANSACTION_FILTER, vec![]),
            FilterSpec::Options(options) => (NEW_FILTER, vec![options.to_value()?]),
        };
        let id = match method.call_async(&manager, args).await? {
            Value::String(id) => id,
            other => return Err(RpcError::InvalidResponse(format!("invalid filter id: {other}"))),
        };
        debug!(%id, ?spec, "filter installed");
        let formatter = match spec {
            FilterSpec::Options(_) => Some(output_log as OutputFormatter),
            _ => None,
        };
        Ok(Self {
            inner: Arc::new(FilterInner {
                spec,
                id,
                manager,
                poller,
                formatter,
                callbacks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Id assigned by the node
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.inner.spec
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.callbacks.lock().len()
    }

    /// Attach a watcher. Log filters first replay the entries that already
    /// match; polling starts with the first watcher.
    pub async fn watch(&self, callback: WatchCallback) -> Result<()> {
        self.inner.callbacks.lock().push(callback.clone());

        if matches!(self.inner.spec, FilterSpec::Options(_)) {
            match self.get_async().await {
                Ok(items) => {
                    for item in items {
                        callback(Ok(item));
                    }
                }
                Err(err) => callback(Err(err)),
            }
        }

        let id = self.inner.id.as_str();
        if !self.inner.poller.is_polling(id) {
            let request = RequestSpec::new(
                GET_FILTER_CHANGES.method_name(&[]),
                vec![Value::String(id.to_string())],
            );
            self.inner
                .poller
                .start_polling(request, id, self.on_update(), self.on_uninstall());
        }
        Ok(())
    }

    /// Stop polling, uninstall on the node and drop every watcher
    pub async fn stop_watching(&self) -> Result<()> {
        let id = self.inner.id.clone();
        self.inner.poller.stop_polling(&id);
        let uninstalled = UNINSTALL_FILTER
            .call_async(&self.inner.manager, vec![Value::String(id.clone())])
            .await;
        self.inner.callbacks.lock().clear();
        debug!(%id, "filter uninstalled");
        uninstalled.map(|_| ())
    }

    /// Every entry matching the filter, fetched on the calling thread
    pub fn get(&self) -> Result<Vec<Value>> {
        let result = GET_FILTER_LOGS.call_sync(&self.inner.manager, self.id_args())?;
        self.format_all(result)
    }

    pub async fn get_async(&self) -> Result<Vec<Value>> {
        let result = GET_FILTER_LOGS
            .call_async(&self.inner.manager, self.id_args())
            .await?;
        self.format_all(result)
    }

    fn id_args(&self) -> Vec<Value> {
        vec![Value::String(self.inner.id.clone())]
    }

    fn format_all(&self, result: Value) -> Result<Vec<Value>> {
        match result {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(|item| self.inner.format(item)).collect(),
            other => Err(RpcError::InvalidResponse(format!(
                "filter logs are not an array: {other}"
            ))),
        }
    }

    fn on_update(&self) -> UpdateCallback {
        let weak: Weak<FilterInner> = Arc::downgrade(&self.inner);
        Arc::new(move |update| {
            if let Some(inner) = weak.upgrade() {
                inner.deliver(update);
            }
        })
    }

    fn on_uninstall(&self) -> UninstallCallback {
        let weak: Weak<FilterInner> = Arc::downgrade(&self.inner);
        let manager = self.inner.manager.clone();
        let id = self.inner.id.clone();
        Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.callbacks.lock().clear();
            }
            // the filter lives on the node that is current now, not after a swap
            let Some(provider) = manager.provider() else {
                debug!(%id, "no provider; nothing to uninstall");
                return;
            };
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                warn!(%id, "no tokio runtime; filter left installed on the node");
                return;
            };
            let manager = manager.clone();
            let id = id.clone();
            runtime.spawn(async move {
                let sent = match UNINSTALL_FILTER.to_spec(vec![Value::String(id.clone())]) {
                    Ok(spec) => manager.send_async_with(provider.as_ref(), &spec).await,
                    Err(err) => Err(err),
                };
                if let Err(err) = sent {
                    debug!(%id, %err, "uninstall after reset failed");
                }
            });
        })
    }
}
