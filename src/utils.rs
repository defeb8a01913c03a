//! Hex, ASCII and quantity helpers shared by the codec and the RPC layer

use alloy_primitives::{keccak256, Address, U256};

use crate::domain::abi::AbiError;

/// Strip an optional `0x` / `0X` prefix
pub fn strip_0x(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Hex of the string's bytes (no prefix), right-padded with zero bytes to at
/// least `pad_bytes`
pub fn ascii_to_hex(value: &str, pad_bytes: usize) -> String {
    let mut hex = hex::encode(value.as_bytes());
    while hex.len() < pad_bytes * 2 {
        hex.push_str("00");
    }
    hex
}

/// Decode hex into text, stopping at the first NUL byte
pub fn hex_to_ascii(value: &str) -> Result<String, AbiError> {
    let bytes = hex::decode(strip_0x(value)).map_err(|e| AbiError::InvalidHex(e.to_string()))?;
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Minimal `0x` quantity encoding, as JSON-RPC expects
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

/// Parse a `0x` hex or plain decimal quantity
pub fn parse_quantity(value: &str) -> Result<U256, AbiError> {
    let trimmed = value.trim();
    let digits = strip_0x(trimmed);
    if digits.len() != trimmed.len() {
        if digits.is_empty() {
            return Ok(U256::ZERO);
        }
        return U256::from_str_radix(digits, 16).map_err(|e| AbiError::InvalidHex(e.to_string()));
    }
    U256::from_str_radix(digits, 10).map_err(|e| AbiError::Parse {
        ty: "quantity".to_string(),
        text: value.to_string(),
        reason: e.to_string(),
    })
}

/// Narrow a quantity to `u64`
pub fn quantity_to_u64(value: U256) -> Option<u64> {
    if value > U256::from(u64::MAX) {
        return None;
    }
    Some(value.as_limbs()[0])
}

/// True for `0x` followed by exactly 64 hex digits
pub fn is_hash(value: &str) -> bool {
    let digits = strip_0x(value);
    digits.len() == 64 && digits.len() + 2 == value.len() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Lowercase `0x` address text
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Keccak-256 of a string, `0x` prefixed
pub fn sha3(value: &str) -> String {
    format!("0x{}", hex::encode(keccak256(value.as_bytes())))
}
