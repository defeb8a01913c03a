//! Method catalogue for the `eth`, `net` and `web3` namespaces

use serde_json::Value;

use super::block::BlockRef;
use super::formatters::{
    input_address, input_block_number, input_bool, input_quantity, input_transaction,
    output_big_number, output_block, output_number, output_receipt, output_syncing,
    output_transaction,
};
use super::method::{InputFormatter, Method, ParamFormatter};

fn by_hash(args: &[Value]) -> bool {
    args.first()
        .and_then(BlockRef::from_value)
        .is_some_and(|block| block.is_hash())
}

fn block_call(args: &[Value]) -> &'static str {
    if by_hash(args) {
        "eth_getBlockByHash"
    } else {
        "eth_getBlockByNumber"
    }
}

fn block_tx_count_call(args: &[Value]) -> &'static str {
    if by_hash(args) {
        "eth_getBlockTransactionCountByHash"
    } else {
        "eth_getBlockTransactionCountByNumber"
    }
}

fn uncle_call(args: &[Value]) -> &'static str {
    if by_hash(args) {
        "eth_getUncleByBlockHashAndIndex"
    } else {
        "eth_getUncleByBlockNumberAndIndex"
    }
}

fn uncle_count_call(args: &[Value]) -> &'static str {
    if by_hash(args) {
        "eth_getUncleCountByBlockHash"
    } else {
        "eth_getUncleCountByBlockNumber"
    }
}

fn tx_from_block_call(args: &[Value]) -> &'static str {
    if by_hash(args) {
        "eth_getTransactionByBlockHashAndIndex"
    } else {
        "eth_getTransactionByBlockNumberAndIndex"
    }
}

const ADDRESS_AT_BLOCK: &[Option<ParamFormatter>] = &[Some(input_address), Some(input_block_number)];
const STORAGE_AT: &[Option<ParamFormatter>] =
    &[Some(input_address), Some(input_quantity), Some(input_block_number)];
const BLOCK_WITH_FLAG: &[Option<ParamFormatter>] = &[Some(input_block_number), Some(input_bool)];
const BLOCK_AND_INDEX: &[Option<ParamFormatter>] = &[Some(input_block_number), Some(input_quantity)];
const BLOCK_ONLY: &[Option<ParamFormatter>] = &[Some(input_block_number)];
const CALL_AT_BLOCK: &[Option<ParamFormatter>] = &[Some(input_transaction), Some(input_block_number)];
const SIGN: &[Option<ParamFormatter>] = &[Some(input_address), None];

pub const ACCOUNTS: Method = Method::new("accounts", "eth_accounts");
pub const BLOCK_NUMBER: Method = Method::new("blockNumber", "eth_blockNumber").output(output_number);
pub const CHAIN_ID: Method = Method::new("chainId", "eth_chainId").output(output_number);
pub const COINBASE: Method = Method::new("coinbase", "eth_coinbase");
pub const MINING: Method = Method::new("mining", "eth_mining");
pub const HASHRATE: Method = Method::new("hashrate", "eth_hashrate").output(output_number);
pub const GAS_PRICE: Method = Method::new("gasPrice", "eth_gasPrice").output(output_big_number);
pub const SYNCING: Method = Method::new("syncing", "eth_syncing").output(output_syncing);

pub const GET_BALANCE: Method = Method::new("getBalance", "eth_getBalance")
    .params(2)
    .inputs(InputFormatter::PerParam(ADDRESS_AT_BLOCK))
    .output(output_big_number);
pub const GET_STORAGE_AT: Method = Method::new("getStorageAt", "eth_getStorageAt")
    .params(3)
    .inputs(InputFormatter::PerParam(STORAGE_AT));
pub const GET_CODE: Method = Method::new("getCode", "eth_getCode")
    .params(2)
    .inputs(InputFormatter::PerParam(ADDRESS_AT_BLOCK));
pub const GET_BLOCK: Method = Method::select("getBlock", block_call)
    .params(2)
    .inputs(InputFormatter::PerParam(BLOCK_WITH_FLAG))
    .output(output_block);
pub const GET_UNCLE: Method = Method::select("getUncle", uncle_call)
    .params(2)
    .inputs(InputFormatter::PerParam(BLOCK_AND_INDEX))
    .output(output_block);
pub const GET_BLOCK_TRANSACTION_COUNT: Method =
    Method::select("getBlockTransactionCount", block_tx_count_call)
        .params(1)
        .inputs(InputFormatter::PerParam(BLOCK_ONLY))
        .output(output_number);
pub const GET_BLOCK_UNCLE_COUNT: Method = Method::select("getBlockUncleCount", uncle_count_call)
    .params(1)
    .inputs(InputFormatter::PerParam(BLOCK_ONLY))
    .output(output_number);
pub const GET_TRANSACTION: Method = Method::new("getTransaction", "eth_getTransactionByHash")
    .params(1)
    .output(output_transaction);
pub const GET_TRANSACTION_FROM_BLOCK: Method =
    Method::select("getTransactionFromBlock", tx_from_block_call)
        .params(2)
        .inputs(InputFormatter::PerParam(BLOCK_AND_INDEX))
        .output(output_transaction);
pub const GET_TRANSACTION_RECEIPT: Method =
    Method::new("getTransactionReceipt", "eth_getTransactionReceipt")
        .params(1)
        .output(output_receipt);
pub const GET_TRANSACTION_COUNT: Method =
    Method::new("getTransactionCount", "eth_getTransactionCount")
        .params(2)
        .inputs(InputFormatter::PerParam(ADDRESS_AT_BLOCK))
        .output(output_number);
pub const SEND_TRANSACTION: Method = Method::new("sendTransaction", "eth_sendTransaction")
    .params(1)
    .inputs(InputFormatter::All(input_transaction));
pub const SEND_RAW_TRANSACTION: Method =
    Method::new("sendRawTransaction", "eth_sendRawTransaction").params(1);
pub const SIGN_DATA: Method = Method::new("sign", "eth_sign")
    .params(2)
    .inputs(InputFormatter::PerParam(SIGN));
pub const CALL: Method = Method::new("call", "eth_call")
    .params(2)
    .inputs(InputFormatter::PerParam(CALL_AT_BLOCK));
pub const ESTIMATE_GAS: Method = Method::new("estimateGas", "eth_estimateGas")
    .params(1)
    .inputs(InputFormatter::All(input_transaction))
    .output(output_number);

// filter plumbing, driven by `Filter`
pub const NEW_FILTER: Method = Method::new("newFilter", "eth_newFilter").params(1);
pub const NEW_BLOCK_FILTER: Method = Method::new("newBlockFilter", "eth_newBlockFilter");
pub const NEW_PENDING_TRANSACTION_FILTER: Method =
    Method::new("newPendingTransactionFilter", "eth_newPendingTransactionFilter");
pub const UNINSTALL_FILTER: Method =
    Method::new("uninstallFilter", "eth_uninstallFilter").params(1);
pub const GET_FILTER_CHANGES: Method =
    Method::new("getFilterChanges", "eth_getFilterChanges").params(1);
pub const GET_FILTER_LOGS: Method = Method::new("getFilterLogs", "eth_getFilterLogs").params(1);
pub const GET_LOGS: Method = Method::new("getLogs", "eth_getLogs").params(1);

pub const NET_VERSION: Method = Method::new("version", "net_version");
pub const NET_LISTENING: Method = Method::new("listening", "net_listening");
pub const NET_PEER_COUNT: Method = Method::new("peerCount", "net_peerCount").output(output_number);

pub const WEB3_CLIENT_VERSION: Method = Method::new("clientVersion", "web3_clientVersion");
pub const WEB3_SHA3: Method = Method::new("sha3", "web3_sha3").params(1);

pub const ETH_METHODS: &[Method] = &[
    ACCOUNTS,
    BLOCK_NUMBER,
    CHAIN_ID,
    COINBASE,
    MINING,
    HASHRATE,
    GAS_PRICE,
    SYNCING,
    GET_BALANCE,
    GET_STORAGE_AT,
    GET_CODE,
    GET_BLOCK,
    GET_UNCLE,
    GET_BLOCK_TRANSACTION_COUNT,
    GET_BLOCK_UNCLE_COUNT,
    GET_TRANSACTION,
    GET_TRANSACTION_FROM_BLOCK,
    GET_TRANSACTION_RECEIPT,
    GET_TRANSACTION_COUNT,
    SEND_TRANSACTION,
    SEND_RAW_TRANSACTION,
    SIGN_DATA,
    CALL,
    ESTIMATE_GAS,
    NEW_FILTER,
    NEW_BLOCK_FILTER,
    NEW_PENDING_TRANSACTION_FILTER,
    UNINSTALL_FILTER,
    GET_FILTER_CHANGES,
    GET_FILTER_LOGS,
    GET_LOGS,
];

pub const NET_METHODS: &[Method] = &[NET_VERSION, NET_LISTENING, NET_PEER_COUNT];

pub const WEB3_METHODS: &[Method] = &[WEB3_CLIENT_VERSION, WEB3_SHA3];

/// Look up `namespace.method` (e.g. `eth.getBalance`); first match wins
pub fn find_method(path: &str) -> Option<Method> {
    let (namespace, name) = path.split_once('.')?;
    let methods = match namespace {
        "eth" => ETH_METHODS,
        "net" => NET_METHODS,
        "web3" => WEB3_METHODS,
        _ => return None,
    };
    methods.iter().find(|method| method.name == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_method_selection() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(GET_BLOCK.method_name(&[json!(hash), json!(false)]), "eth_getBlockByHash");
        assert_eq!(GET_BLOCK.method_name(&[json!(12), json!(false)]), "eth_getBlockByNumber");
        assert_eq!(GET_BLOCK.method_name(&[json!("latest"), json!(false)]), "eth_getBlockByNumber");
        assert_eq!(
            GET_TRANSACTION_FROM_BLOCK.method_name(&[json!(hash), json!(0)]),
            "eth_getTransactionByBlockHashAndIndex"
        );
    }

    #[test]
    fn test_get_balance_request() {
        let addr = format!("0x{}", "AA".repeat(20));
        let spec = GET_BALANCE.to_spec(vec![json!(addr), json!(100)]).unwrap();
        assert_eq!(spec.method, "eth_getBalance");
        assert_eq!(spec.params[0], json!(format!("0x{}", "aa".repeat(20))));
        assert_eq!(spec.params[1], json!("0x64"));
    }

    #[test]
    fn test_find_method() {
        assert_eq!(find_method("eth.blockNumber").map(|m| m.name), Some("blockNumber"));
        assert_eq!(find_method("net.peerCount").map(|m| m.name), Some("peerCount"));
        assert!(find_method("eth.nope").is_none());
        assert!(find_method("blockNumber").is_none());
    }
}
