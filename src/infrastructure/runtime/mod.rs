//! Runtime infrastructure - tokio-driven polling of installed filters

mod poller;

pub use poller::{Poller, UninstallCallback, UpdateCallback, DEFAULT_POLL_INTERVAL};
