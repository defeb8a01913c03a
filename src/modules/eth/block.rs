//! Block references

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::infrastructure::rpc::RpcError;
use crate::utils::{is_hash, parse_quantity, quantity_to_u64};

/// Named block positions understood by every node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Earliest,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
            BlockTag::Earliest => "earliest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "latest" => Some(BlockTag::Latest),
            "pending" => Some(BlockTag::Pending),
            "earliest" => Some(BlockTag::Earliest),
            _ => None,
        }
    }
}

/// A block addressed by hash, by number, or by tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    Hash(String),
    Number(u64),
    Tag(BlockTag),
}

impl Default for BlockRef {
    fn default() -> Self {
        BlockRef::Tag(BlockTag::Latest)
    }
}

impl BlockRef {
    pub fn is_hash(&self) -> bool {
        matches!(self, BlockRef::Hash(_))
    }

    /// JSON-RPC parameter form
    pub fn to_value(&self) -> Value {
        match self {
            BlockRef::Hash(hash) => Value::String(hash.clone()),
            BlockRef::Number(n) => Value::String(format!("0x{n:x}")),
            BlockRef::Tag(tag) => Value::String(tag.as_str().to_string()),
        }
    }

    /// Read back a parameter built by [`BlockRef::to_value`] or given raw
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(BlockRef::Number),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<u64> for BlockRef {
    fn from(number: u64) -> Self {
        BlockRef::Number(number)
    }
}

impl From<BlockTag> for BlockRef {
    fn from(tag: BlockTag) -> Self {
        BlockRef::Tag(tag)
    }
}

impl FromStr for BlockRef {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(tag) = BlockTag::parse(s) {
            return Ok(BlockRef::Tag(tag));
        }
        if is_hash(s) {
            return Ok(BlockRef::Hash(s.to_lowercase()));
        }
        let number = parse_quantity(s)?;
        quantity_to_u64(number)
            .map(BlockRef::Number)
            .ok_or_else(|| RpcError::InvalidInput(format!("block number {s} out of range")))
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Hash(hash) => f.write_str(hash),
            BlockRef::Number(n) => write!(f, "{n}"),
            BlockRef::Tag(tag) => f.write_str(tag.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block_ref() {
        assert_eq!("latest".parse::<BlockRef>().unwrap(), BlockRef::Tag(BlockTag::Latest));
        assert_eq!("0x10".parse::<BlockRef>().unwrap(), BlockRef::Number(16));
        assert_eq!("16".parse::<BlockRef>().unwrap(), BlockRef::Number(16));
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(hash.parse::<BlockRef>().unwrap(), BlockRef::Hash(hash.clone()));
        assert!("newest".parse::<BlockRef>().is_err());
    }

    #[test]
    fn test_value_roundtrip() {
        for block in [
            BlockRef::Number(1234),
            BlockRef::Tag(BlockTag::Pending),
            BlockRef::Hash(format!("0x{}", "cd".repeat(32))),
        ] {
            assert_eq!(BlockRef::from_value(&block.to_value()), Some(block));
        }
    }
}
