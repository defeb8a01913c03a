//! Argument and result formatters for remote methods
//!
//! Input formatters turn user-facing values into JSON-RPC parameters;
//! output formatters turn hex quantities in results into numbers.

use alloy_primitives::U256;
use serde_json::{Map, Value};

use super::block::BlockRef;
use crate::infrastructure::rpc::RpcError;
use crate::utils::{ascii_to_hex, is_hash, parse_quantity, quantity_to_u64, strip_0x, to_quantity};

type Result<T> = std::result::Result<T, RpcError>;

const TX_QUANTITY_FIELDS: &[&str] = &["gas", "gasPrice", "value", "nonce", "maxFeePerGas", "maxPriorityFeePerGas"];

fn invalid(what: &str, value: &Value) -> RpcError {
    RpcError::InvalidInput(format!("{what}: {value}"))
}

/// Lowercase `0x` address with exactly 20 bytes
pub fn input_address(value: &Value) -> Result<Value> {
    let text = value.as_str().ok_or_else(|| invalid("address must be a string", value))?;
    let digits = strip_0x(text.trim());
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("invalid address", value));
    }
    Ok(Value::String(format!("0x{}", digits.to_lowercase())))
}

/// Tags and hashes pass through; numbers become hex quantities
pub fn input_block_number(value: &Value) -> Result<Value> {
    if let Some(text) = value.as_str() {
        if is_hash(text) {
            return Ok(value.clone());
        }
    }
    BlockRef::from_value(value)
        .map(|block| block.to_value())
        .ok_or_else(|| invalid("invalid block reference", value))
}

/// Numbers or decimal strings become hex quantities
pub fn input_quantity(value: &Value) -> Result<Value> {
    let number = match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| invalid("quantity must be a non-negative integer", value))?,
        Value::String(s) => parse_quantity(s)?,
        _ => return Err(invalid("invalid quantity", value)),
    };
    Ok(Value::String(to_quantity(number)))
}

pub fn input_bool(value: &Value) -> Result<Value> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        _ => Err(invalid("expected a boolean", value)),
    }
}

/// Transaction / call objects: addresses normalized, amounts hex-encoded
pub fn input_transaction(value: &Value) -> Result<Value> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid("transaction must be an object", value))?;
    let mut out = object.clone();
    for key in ["from", "to"] {
        if let Some(address) = object.get(key).filter(|v| !v.is_null()) {
            out.insert(key.to_string(), input_address(address)?);
        }
    }
    for key in TX_QUANTITY_FIELDS {
        if let Some(amount) = object.get(*key).filter(|v| !v.is_null()) {
            out.insert(key.to_string(), input_quantity(amount)?);
        }
    }
    Ok(Value::Object(out))
}

/// `0x` hex passes through; anything else is ASCII-encoded
pub fn to_topic(value: &str) -> String {
    if value.starts_with("0x") {
        value.to_string()
    } else {
        format!("0x{}", ascii_to_hex(value, 0))
    }
}

/// Hex quantity to a JSON number; values past `u64` stay decimal strings
pub fn output_number(value: Value) -> Result<Value> {
    let number = quantity_of(&value)?;
    Ok(match quantity_to_u64(number) {
        Some(n) => Value::from(n),
        None => Value::String(number.to_string()),
    })
}

/// Hex quantity to a decimal string
pub fn output_big_number(value: Value) -> Result<Value> {
    Ok(Value::String(quantity_of(&value)?.to_string()))
}

pub fn output_transaction(value: Value) -> Result<Value> {
    map_object(value, |object| {
        convert(object, &["blockNumber", "transactionIndex", "nonce", "gas", "type", "chainId"], output_number)?;
        convert(object, &["value", "gasPrice", "maxFeePerGas", "maxPriorityFeePerGas"], output_big_number)
    })
}

pub fn output_log(value: Value) -> Result<Value> {
    map_object(value, |object| {
        convert(object, &["blockNumber", "transactionIndex", "logIndex"], output_number)
    })
}

pub fn output_receipt(value: Value) -> Result<Value> {
    map_object(value, |object| {
        convert(
            object,
            &["blockNumber", "transactionIndex", "cumulativeGasUsed", "gasUsed", "status", "type"],
            output_number,
        )?;
        convert(object, &["effectiveGasPrice"], output_big_number)?;
        if let Some(Value::Array(logs)) = object.remove("logs") {
            let logs = logs.into_iter().map(output_log).collect::<Result<Vec<_>>>()?;
            object.insert("logs".to_string(), Value::Array(logs));
        }
        Ok(())
    })
}

/// Block header numbers, plus full transactions when present
pub fn output_block(value: Value) -> Result<Value> {
    map_object(value, |object| {
        convert(object, &["number", "gasLimit", "gasUsed", "size", "timestamp"], output_number)?;
        convert(object, &["difficulty", "totalDifficulty", "baseFeePerGas"], output_big_number)?;
        if let Some(Value::Array(txs)) = object.remove("transactions") {
            let txs = txs
                .into_iter()
                .map(|tx| if tx.is_object() { output_transaction(tx) } else { Ok(tx) })
                .collect::<Result<Vec<_>>>()?;
            object.insert("transactions".to_string(), Value::Array(txs));
        }
        Ok(())
    })
}

/// `false` when idle, otherwise the progress object with numeric fields
pub fn output_syncing(value: Value) -> Result<Value> {
    if value.is_boolean() {
        return Ok(value);
    }
    map_object(value, |object| {
        convert(object, &["startingBlock", "currentBlock", "highestBlock"], output_number)
    })
}

fn quantity_of(value: &Value) -> Result<U256> {
    match value {
        Value::String(s) => Ok(parse_quantity(s)?),
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| RpcError::InvalidResponse(format!("invalid quantity: {value}"))),
        _ => Err(RpcError::InvalidResponse(format!("invalid quantity: {value}"))),
    }
}

fn map_object(value: Value, f: impl FnOnce(&mut Map<String, Value>) -> Result<()>) -> Result<Value> {
    match value {
        Value::Object(mut object) => {
            f(&mut object)?;
            Ok(Value::Object(object))
        }
        other => Ok(other),
    }
}

fn convert(
    object: &mut Map<String, Value>,
    keys: &[&str],
    f: fn(Value) -> Result<Value>,
) -> Result<()> {
    for key in keys {
        if let Some(field) = object.get_mut(*key) {
            if !field.is_null() {
                *field = f(field.take())?;
            }
        }
    }
    Ok(())
}

/// Read a formatted numeric result as `u64`
pub(crate) fn value_to_u64(value: &Value) -> Result<u64> {
    quantity_of(value).and_then(|n| {
        quantity_to_u64(n).ok_or_else(|| RpcError::InvalidResponse(format!("{n} exceeds u64")))
    })
}

/// Read a formatted numeric result as `U256`
pub(crate) fn value_to_u256(value: &Value) -> Result<U256> {
    quantity_of(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_address() {
        let addr = format!("0x{}", "AB".repeat(20));
        assert_eq!(input_address(&json!(addr)).unwrap(), json!(format!("0x{}", "ab".repeat(20))));
        assert!(input_address(&json!("0x1234")).is_err());
        assert!(input_address(&json!(5)).is_err());
    }

    #[test]
    fn test_input_block_number() {
        assert_eq!(input_block_number(&json!("latest")).unwrap(), json!("latest"));
        assert_eq!(input_block_number(&json!(255)).unwrap(), json!("0xff"));
        assert_eq!(input_block_number(&json!("255")).unwrap(), json!("0xff"));
        assert!(input_block_number(&json!(true)).is_err());
    }

    #[test]
    fn test_input_transaction() {
        let tx = json!({"to": format!("0x{}", "11".repeat(20)), "value": "1000", "gas": 21000, "data": "0x"});
        let out = input_transaction(&tx).unwrap();
        assert_eq!(out["value"], "0x3e8");
        assert_eq!(out["gas"], "0x5208");
        assert_eq!(out["data"], "0x");
    }

    #[test]
    fn test_to_topic() {
        assert_eq!(to_topic("0xdead"), "0xdead");
        assert_eq!(to_topic("hi"), "0x6869");
    }

    #[test]
    fn test_output_block() {
        let block = json!({
            "number": "0x10",
            "timestamp": "0x5f5e100",
            "difficulty": "0xffffffffffffffffffff",
            "transactions": ["0xaa", {"blockNumber": "0x10", "value": "0x1"}],
        });
        let out = output_block(block).unwrap();
        assert_eq!(out["number"], 16);
        assert_eq!(out["timestamp"], 100_000_000);
        assert_eq!(out["difficulty"], "1208925819614629174706175");
        assert_eq!(out["transactions"][0], "0xaa");
        assert_eq!(out["transactions"][1]["blockNumber"], 16);
        assert_eq!(out["transactions"][1]["value"], "1");
    }

    #[test]
    fn test_output_syncing_false() {
        assert_eq!(output_syncing(json!(false)).unwrap(), json!(false));
    }
}
