//! Typed `eth`, `net` and `web3` namespaces

use std::sync::Arc;

use alloy_json_abi::Function;
use alloy_primitives::{Address, U256};
use serde_json::Value;

use super::batch::Batch;
use super::block::BlockRef;
use super::filter::{Filter, FilterSpec};
use super::formatters::{value_to_u256, value_to_u64};
use super::method::Method;
use super::methods;
use crate::domain::abi::{decode_function_output, encode_function_call, AbiCoder, AbiValue};
use crate::infrastructure::rpc::{RequestManager, RpcError};
use crate::infrastructure::runtime::Poller;
use crate::utils::{address_hex, to_quantity};

type Result<T> = std::result::Result<T, RpcError>;

fn address_arg(address: &Address) -> Value {
    Value::String(address_hex(address))
}

fn string_result(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(RpcError::InvalidResponse(format!("expected a string, got {other}"))),
    }
}

fn bool_result(value: Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(RpcError::InvalidResponse(format!("expected a bool, got {other}"))),
    }
}

fn optional(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

/// `eth_*` calls
#[derive(Debug, Clone)]
pub struct Eth {
    manager: Arc<RequestManager>,
    poller: Poller,
    coder: Arc<AbiCoder>,
}

impl Eth {
    pub fn new(manager: Arc<RequestManager>, poller: Poller, coder: Arc<AbiCoder>) -> Self {
        Self {
            manager,
            poller,
            coder,
        }
    }

    /// Run any catalogue method
    pub async fn request(&self, method: &Method, args: Vec<Value>) -> Result<Value> {
        method.call_async(&self.manager, args).await
    }

    pub fn request_sync(&self, method: &Method, args: Vec<Value>) -> Result<Value> {
        method.call_sync(&self.manager, args)
    }

    pub async fn block_number(&self) -> Result<u64> {
        value_to_u64(&self.request(&methods::BLOCK_NUMBER, vec![]).await?)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        value_to_u64(&self.request(&methods::CHAIN_ID, vec![]).await?)
    }

    pub async fn accounts(&self) -> Result<Vec<String>> {
        let value = self.request(&methods::ACCOUNTS, vec![]).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn coinbase(&self) -> Result<String> {
        string_result(self.request(&methods::COINBASE, vec![]).await?)
    }

    pub async fn mining(&self) -> Result<bool> {
        bool_result(self.request(&methods::MINING, vec![]).await?)
    }

    pub async fn hashrate(&self) -> Result<u64> {
        value_to_u64(&self.request(&methods::HASHRATE, vec![]).await?)
    }

    pub async fn gas_price(&self) -> Result<U256> {
        value_to_u256(&self.request(&methods::GAS_PRICE, vec![]).await?)
    }

    /// `false` when the node is not syncing, otherwise its progress object
    pub async fn syncing(&self) -> Result<Value> {
        self.request(&methods::SYNCING, vec![]).await
    }

    pub async fn balance(&self, address: &Address, block: BlockRef) -> Result<U256> {
        let args = vec![address_arg(address), block.to_value()];
        value_to_u256(&self.request(&methods::GET_BALANCE, args).await?)
    }

    pub async fn storage_at(&self, address: &Address, slot: U256, block: BlockRef) -> Result<String> {
        let args = vec![address_arg(address), Value::String(to_quantity(slot)), block.to_value()];
        string_result(self.request(&methods::GET_STORAGE_AT, args).await?)
    }

    pub async fn code(&self, address: &Address, block: BlockRef) -> Result<String> {
        let args = vec![address_arg(address), block.to_value()];
        string_result(self.request(&methods::GET_CODE, args).await?)
    }

    pub async fn transaction_count(&self, address: &Address, block: BlockRef) -> Result<u64> {
        let args = vec![address_arg(address), block.to_value()];
        value_to_u64(&self.request(&methods::GET_TRANSACTION_COUNT, args).await?)
    }

    /// Block by hash, number or tag; `None` if the node does not know it
    pub async fn block(&self, block: BlockRef, full_transactions: bool) -> Result<Option<Value>> {
        let args = vec![block.to_value(), Value::Bool(full_transactions)];
        Ok(optional(self.request(&methods::GET_BLOCK, args).await?))
    }

    pub async fn block_transaction_count(&self, block: BlockRef) -> Result<Option<u64>> {
        let value = self
            .request(&methods::GET_BLOCK_TRANSACTION_COUNT, vec![block.to_value()])
            .await?;
        optional(value).map(|v| value_to_u64(&v)).transpose()
    }

    pub async fn uncle(&self, block: BlockRef, index: u64) -> Result<Option<Value>> {
        let args = vec![block.to_value(), Value::from(index)];
        Ok(optional(self.request(&methods::GET_UNCLE, args).await?))
    }

    pub async fn uncle_count(&self, block: BlockRef) -> Result<Option<u64>> {
        let value = self
            .request(&methods::GET_BLOCK_UNCLE_COUNT, vec![block.to_value()])
            .await?;
        optional(value).map(|v| value_to_u64(&v)).transpose()
    }

    pub async fn transaction(&self, hash: &str) -> Result<Option<Value>> {
        let args = vec![Value::String(hash.to_string())];
        Ok(optional(self.request(&methods::GET_TRANSACTION, args).await?))
    }

    pub async fn transaction_from_block(&self, block: BlockRef, index: u64) -> Result<Option<Value>> {
        let args = vec![block.to_value(), Value::from(index)];
        Ok(optional(self.request(&methods::GET_TRANSACTION_FROM_BLOCK, args).await?))
    }

    pub async fn transaction_receipt(&self, hash: &str) -> Result<Option<Value>> {
        let args = vec![Value::String(hash.to_string())];
        Ok(optional(self.request(&methods::GET_TRANSACTION_RECEIPT, args).await?))
    }

    /// Sends through the node's unlocked account; returns the hash
    pub async fn send_transaction(&self, tx: Value) -> Result<String> {
        string_result(self.request(&methods::SEND_TRANSACTION, vec![tx]).await?)
    }

    pub async fn send_raw_transaction(&self, raw: &str) -> Result<String> {
        let args = vec![Value::String(raw.to_string())];
        string_result(self.request(&methods::SEND_RAW_TRANSACTION, args).await?)
    }

    pub async fn sign(&self, address: &Address, data: &str) -> Result<String> {
        let args = vec![address_arg(address), Value::String(data.to_string())];
        string_result(self.request(&methods::SIGN_DATA, args).await?)
    }

    /// Raw `eth_call`; returns the `0x` return data
    pub async fn call(&self, tx: Value, block: BlockRef) -> Result<String> {
        string_result(self.request(&methods::CALL, vec![tx, block.to_value()]).await?)
    }

    pub async fn estimate_gas(&self, tx: Value) -> Result<u64> {
        value_to_u64(&self.request(&methods::ESTIMATE_GAS, vec![tx]).await?)
    }

    /// Encode the call, run it with `eth_call` and decode the outputs
    pub async fn call_function(
        &self,
        to: &Address,
        function: &Function,
        args: &[AbiValue],
        block: BlockRef,
    ) -> Result<Vec<AbiValue>> {
        let data = encode_function_call(&self.coder, function, args)?;
        let tx = serde_json::json!({ "to": address_hex(to), "data": data });
        let output = self.call(tx, block).await?;
        Ok(decode_function_output(&self.coder, function, &output)?)
    }

    /// Install a filter that polls through this client's poller
    pub async fn filter(&self, spec: FilterSpec) -> Result<Filter> {
        Filter::install(self.manager.clone(), self.poller.clone(), spec).await
    }

    pub fn batch(&self) -> Batch {
        Batch::new(self.manager.clone())
    }

    pub fn block_number_sync(&self) -> Result<Option<u64>> {
        let value = self.request_sync(&methods::BLOCK_NUMBER, vec![])?;
        optional(value).map(|v| value_to_u64(&v)).transpose()
    }
}

/// `net_*` calls
#[derive(Debug, Clone)]
pub struct Net {
    manager: Arc<RequestManager>,
}

impl Net {
    pub fn new(manager: Arc<RequestManager>) -> Self {
        Self { manager }
    }

    pub async fn version(&self) -> Result<String> {
        string_result(methods::NET_VERSION.call_async(&self.manager, vec![]).await?)
    }

    pub async fn listening(&self) -> Result<bool> {
        bool_result(methods::NET_LISTENING.call_async(&self.manager, vec![]).await?)
    }

    pub fn listening_sync(&self) -> Result<bool> {
        bool_result(methods::NET_LISTENING.call_sync(&self.manager, vec![])?)
    }

    pub async fn peer_count(&self) -> Result<u64> {
        value_to_u64(&methods::NET_PEER_COUNT.call_async(&self.manager, vec![]).await?)
    }
}

/// `web3_*` calls
#[derive(Debug, Clone)]
pub struct Web3 {
    manager: Arc<RequestManager>,
}

impl Web3 {
    pub fn new(manager: Arc<RequestManager>) -> Self {
        Self { manager }
    }

    pub async fn client_version(&self) -> Result<String> {
        string_result(methods::WEB3_CLIENT_VERSION.call_async(&self.manager, vec![]).await?)
    }

    /// Keccak-256 computed by the node over `0x` hex data
    pub async fn sha3(&self, data: &str) -> Result<String> {
        let args = vec![Value::String(data.to_string())];
        string_result(methods::WEB3_SHA3.call_async(&self.manager, args).await?)
    }
}
