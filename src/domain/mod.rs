//! Domain layer - pure, I/O-free encoding logic

pub mod abi;
