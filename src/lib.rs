//! Ethereum ABI codec and JSON-RPC client
//!
//! Layers:
//! - domain: the Solidity ABI codec (pure, no I/O)
//! - infrastructure: JSON-RPC envelope, transports and the filter poller
//! - modules: `eth`/`net`/`web3` method catalogue, filters and batches
//! - client: the session object tying them together

pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod utils;

pub use client::Client;
pub use domain::abi::{AbiCoder, AbiError, AbiValue, FixedPoint, SolidityType, Word};
pub use infrastructure::rpc::{RequestManager, RequestSpec, RpcError};
pub use infrastructure::runtime::Poller;
pub use infrastructure::transport::{HttpTransport, Transport};
pub use modules::eth::{Batch, BlockRef, BlockTag, Filter, FilterOptions, FilterSpec, Method};
