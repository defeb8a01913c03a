//! Plain values accepted by the encoder and produced by the decoder

use std::fmt;

use alloy_primitives::{Address, I256, U256};
use serde_json::Value;

use super::fixed::FixedPoint;

/// A plain value for one ABI parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    /// Signed integer; also accepted by unsigned and address types
    Int(I256),
    Uint(U256),
    Address(Address),
    /// Text for `bytes`, `bytesN` and `string`
    Bytes(String),
    /// Decimal for `real` / `ureal`
    Fixed(FixedPoint),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Short kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Bool(_) => "bool",
            AbiValue::Int(_) => "int",
            AbiValue::Uint(_) => "uint",
            AbiValue::Address(_) => "address",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::Fixed(_) => "fixed",
            AbiValue::Array(_) => "array",
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JSON rendering: big numbers as decimal strings, addresses as `0x` hex
    pub fn to_json(&self) -> Value {
        match self {
            AbiValue::Bool(b) => Value::Bool(*b),
            AbiValue::Int(n) => Value::String(n.to_string()),
            AbiValue::Uint(n) => Value::String(n.to_string()),
            AbiValue::Address(a) => Value::String(format!("0x{}", hex::encode(a.as_slice()))),
            AbiValue::Bytes(s) => Value::String(s.clone()),
            AbiValue::Fixed(f) => Value::String(f.to_string()),
            AbiValue::Array(items) => Value::Array(items.iter().map(AbiValue::to_json).collect()),
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Int(n) => write!(f, "{n}"),
            AbiValue::Uint(n) => write!(f, "{n}"),
            AbiValue::Address(a) => write!(f, "0x{}", hex::encode(a.as_slice())),
            AbiValue::Bytes(s) => write!(f, "{s:?}"),
            AbiValue::Fixed(x) => write!(f, "{x}"),
            AbiValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<i64> for AbiValue {
    fn from(value: i64) -> Self {
        let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));
        AbiValue::Int(if value < 0 { -magnitude } else { magnitude })
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        AbiValue::Int(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::Bytes(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::Bytes(value)
    }
}

impl From<FixedPoint> for AbiValue {
    fn from(value: FixedPoint) -> Self {
        AbiValue::Fixed(value)
    }
}

impl<T: Into<AbiValue>> From<Vec<T>> for AbiValue {
    fn from(values: Vec<T>) -> Self {
        AbiValue::Array(values.into_iter().map(Into::into).collect())
    }
}
