//! Ethereum JSON-RPC namespaces
//!
//! [`Method`] entries describe remote calls; [`Eth`], [`Net`] and [`Web3`]
//! wrap them in typed async functions. [`Filter`] and [`Batch`] build on
//! the same descriptors.

mod api;
mod batch;
mod block;
mod filter;
pub mod formatters;
mod method;
pub mod methods;

pub use api::{Eth, Net, Web3};
pub use batch::Batch;
pub use block::{BlockRef, BlockTag};
pub use filter::{Filter, FilterOptions, FilterSpec, WatchCallback};
pub use method::{InputFormatter, Method, OutputFormatter, ParamFormatter, PreparedRequest, RpcCall};
pub use methods::find_method;
