//! Client modules
//!
//! Modules:
//! - eth: remote-method descriptors and the `eth`/`net`/`web3` namespaces,
//!   block references, filters and batches

pub mod eth;
