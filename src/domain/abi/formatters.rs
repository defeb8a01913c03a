//! Scalar input/output formatters used by the type registry

use alloy_primitives::{Address, I256, U256};

use super::error::{AbiError, Result};
use super::fixed::FixedPoint;
use super::value::AbiValue;
use super::word::{Word, WORD_BYTES, WORD_HEX_LEN};
use crate::utils::{ascii_to_hex, hex_to_ascii};

/// Padding width of fixed-length bytes, in bytes
pub const BYTES_PADDING: usize = WORD_BYTES;

/// 64 hex chars of a 256-bit value
pub(crate) fn encode_u256(value: U256) -> String {
    hex::encode(value.to_be_bytes::<32>())
}

/// Parse one slot as an unsigned 256-bit value; empty reads as zero
pub(crate) fn parse_u256(hex_word: &str) -> Result<U256> {
    if hex_word.is_empty() {
        return Ok(U256::ZERO);
    }
    let bytes = hex::decode(hex_word).map_err(|e| AbiError::InvalidHex(e.to_string()))?;
    if bytes.len() > WORD_BYTES {
        return Err(AbiError::InvalidHex(format!(
            "slot of {} bytes exceeds {WORD_BYTES}",
            bytes.len()
        )));
    }
    Ok(U256::from_be_slice(&bytes))
}

fn invalid(expected: &'static str, value: &AbiValue) -> AbiError {
    AbiError::InvalidValue {
        expected,
        found: value.kind(),
    }
}

/// Two's complement over 256 bits
pub fn format_input_int(value: &AbiValue) -> Result<Word> {
    let raw = match value {
        AbiValue::Int(n) => n.into_raw(),
        AbiValue::Uint(n) => *n,
        other => return Err(invalid("integer", other)),
    };
    Ok(Word::new(encode_u256(raw)))
}

pub fn format_input_bool(value: &AbiValue) -> Result<Word> {
    match value {
        AbiValue::Bool(b) => Ok(Word::new(encode_u256(U256::from(*b as u8)))),
        other => Err(invalid("bool", other)),
    }
}

/// Addresses are right-aligned integers
pub fn format_input_address(value: &AbiValue) -> Result<Word> {
    match value {
        AbiValue::Address(address) => Ok(Word::new(encode_u256(U256::from_be_slice(
            address.as_slice(),
        )))),
        AbiValue::Uint(_) | AbiValue::Int(_) => format_input_int(value),
        other => Err(invalid("address", other)),
    }
}

/// Left-aligned text, NUL padded to one slot
pub fn format_input_bytes(value: &AbiValue) -> Result<Word> {
    let AbiValue::Bytes(text) = value else {
        return Err(invalid("bytes", value));
    };
    if text.len() > BYTES_PADDING {
        return Err(AbiError::ValueTooLong {
            max: BYTES_PADDING,
            len: text.len(),
        });
    }
    Ok(Word::new(ascii_to_hex(text, BYTES_PADDING)))
}

/// Length word followed by the text, padded to whole slots
pub fn format_input_dynamic_bytes(value: &AbiValue) -> Result<Word> {
    let AbiValue::Bytes(text) = value else {
        return Err(invalid("bytes", value));
    };
    let padded_len = text.len().div_ceil(WORD_BYTES).max(1) * WORD_BYTES;
    let content = ascii_to_hex(text, padded_len);
    let length = encode_u256(U256::from(text.len()));
    Ok(Word::new(format!("{length}{content}")).with_offset(WORD_BYTES))
}

/// Scale by 2^128, then encode as a signed integer
pub fn format_input_real(value: &AbiValue) -> Result<Word> {
    let fixed = fixed_input(value)?;
    format_input_int(&AbiValue::Int(fixed.to_signed_raw()?))
}

pub fn format_input_ureal(value: &AbiValue) -> Result<Word> {
    let fixed = fixed_input(value)?;
    format_input_int(&AbiValue::Uint(fixed.to_unsigned_raw()?))
}

fn fixed_input(value: &AbiValue) -> Result<FixedPoint> {
    match value {
        AbiValue::Fixed(f) => Ok(*f),
        AbiValue::Bytes(text) => text.parse(),
        other => Err(invalid("fixed", other)),
    }
}

/// Signed decode: the top bit of the slot is the sign
pub fn format_output_int(word: &Word) -> Result<AbiValue> {
    let raw = parse_u256(&word.static_part())?;
    Ok(AbiValue::Int(I256::from_raw(raw)))
}

pub fn format_output_uint(word: &Word) -> Result<AbiValue> {
    Ok(AbiValue::Uint(parse_u256(&word.static_part())?))
}

pub fn format_output_bool(word: &Word) -> Result<AbiValue> {
    Ok(AbiValue::Bool(word.static_part() == encode_u256(U256::from(1u8))))
}

/// Low 20 bytes of the slot
pub fn format_output_address(word: &Word) -> Result<AbiValue> {
    let head = word.static_part();
    let out_of_bounds = AbiError::OutOfBounds {
        start: head.len().saturating_sub(40),
        end: head.len(),
        len: head.len(),
    };
    let low = head
        .len()
        .checked_sub(40)
        .and_then(|start| head.get(start..))
        .ok_or(out_of_bounds)?;
    let bytes = hex::decode(low).map_err(|e| AbiError::InvalidHex(e.to_string()))?;
    Ok(AbiValue::Address(Address::from_slice(&bytes)))
}

pub fn format_output_bytes(word: &Word) -> Result<AbiValue> {
    Ok(AbiValue::Bytes(hex_to_ascii(&word.static_part())?))
}

/// Skip the length word, then read NUL-terminated text
pub fn format_output_dynamic_bytes(word: &Word) -> Result<AbiValue> {
    let tail = word.dynamic_part();
    let content = tail.get(WORD_HEX_LEN..).unwrap_or("");
    Ok(AbiValue::Bytes(hex_to_ascii(content)?))
}

pub fn format_output_real(word: &Word) -> Result<AbiValue> {
    let raw = parse_u256(&word.static_part())?;
    Ok(AbiValue::Fixed(FixedPoint::from_signed_raw(I256::from_raw(raw))))
}

pub fn format_output_ureal(word: &Word) -> Result<AbiValue> {
    let raw = parse_u256(&word.static_part())?;
    Ok(AbiValue::Fixed(FixedPoint::from_unsigned_raw(raw)))
}
