//! Client session: one request manager, one poller, one ABI coder
//!
//! Nothing here is global. Each [`Client`] numbers its own requests and owns
//! its own poll registry, and its transport can be swapped at runtime.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::abi::AbiCoder;
use crate::infrastructure::rpc::{RequestManager, RpcError};
use crate::infrastructure::runtime::Poller;
use crate::infrastructure::transport::{HttpTransport, Transport};
use crate::modules::eth::{Batch, Eth, Net, Web3};

#[derive(Debug, Clone)]
pub struct Client {
    manager: Arc<RequestManager>,
    poller: Poller,
    coder: Arc<AbiCoder>,
}

impl Client {
    pub fn new(provider: Option<Arc<dyn Transport>>, poll_interval: Duration) -> Self {
        let manager = Arc::new(RequestManager::new(provider));
        let poller = Poller::new(manager.clone(), poll_interval);
        Self {
            manager,
            poller,
            coder: Arc::new(AbiCoder::default()),
        }
    }

    /// HTTP client for `url` with the default poll interval
    pub fn http(url: impl Into<String>) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(url));
        Self::new(Some(transport), crate::infrastructure::runtime::DEFAULT_POLL_INTERVAL)
    }

    /// HTTP client from a loaded config; `rpc` overrides the configured URL
    pub fn from_config(config: &Config, rpc: Option<&str>) -> Result<Self, RpcError> {
        let url = rpc.map(str::to_string).unwrap_or_else(|| config.rpc_url());
        let mut transport = HttpTransport::new(url.clone());
        if let Some(timeout) = config.timeout() {
            transport = transport.with_timeout(timeout)?;
        }
        info!(%url, "using node");
        Ok(Self::new(Some(Arc::new(transport)), config.poll_interval()))
    }

    /// Swap the transport; every active poll entry is uninstalled
    pub fn set_provider(&self, provider: Option<Arc<dyn Transport>>) {
        debug!(
            endpoint = provider.as_ref().map(|p| p.endpoint_name()),
            "switching provider"
        );
        self.poller.reset();
        self.manager.set_provider(provider);
    }

    /// Uninstall every filter and restart the poll timer
    pub fn reset(&self) {
        self.poller.reset();
    }

    pub fn manager(&self) -> &Arc<RequestManager> {
        &self.manager
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn abi(&self) -> &AbiCoder {
        &self.coder
    }

    pub fn eth(&self) -> Eth {
        Eth::new(self.manager.clone(), self.poller.clone(), self.coder.clone())
    }

    pub fn net(&self) -> Net {
        Net::new(self.manager.clone())
    }

    pub fn web3(&self) -> Web3 {
        Web3::new(self.manager.clone())
    }

    pub fn batch(&self) -> Batch {
        Batch::new(self.manager.clone())
    }

    /// True if the node answers `net_listening`
    pub async fn is_connected(&self) -> bool {
        self.net().listening().await.unwrap_or(false)
    }

    pub fn is_connected_sync(&self) -> bool {
        self.net().listening_sync().unwrap_or(false)
    }
}
