//! Argument-list encoder/decoder driven by declared type strings

use std::str::FromStr;

use alloy_primitives::{Address, I256, U256};

use super::error::{AbiError, Result};
use super::fixed::FixedPoint;
use super::types::{is_array, SolidityType, TypeFamily, DEFAULT_TYPES};
use super::value::AbiValue;
use super::word::Word;
use crate::utils::strip_0x;

/// Dispatches declared types to their descriptors
#[derive(Debug, Clone)]
pub struct AbiCoder {
    types: Vec<SolidityType>,
}

impl Default for AbiCoder {
    fn default() -> Self {
        Self::new(DEFAULT_TYPES.to_vec())
    }
}

impl AbiCoder {
    /// Create a coder over a custom registry; order decides priority
    pub fn new(types: Vec<SolidityType>) -> Self {
        Self { types }
    }

    /// First descriptor matching `declared`
    pub fn require_type(&self, declared: &str) -> Result<&SolidityType> {
        self.types
            .iter()
            .find(|ty| ty.is_type(declared))
            .ok_or_else(|| AbiError::UnsupportedType(declared.to_string()))
    }

    /// Encode a single value as a complete parameter block
    pub fn encode_param(&self, declared: &str, value: &AbiValue) -> Result<String> {
        let ty = self.require_type(declared)?;
        Ok(ty.format_input(value, is_array(declared))?.encode())
    }

    /// Encode an argument list: head slots, then tail payloads
    pub fn encode_params<S: AsRef<str>>(&self, types: &[S], values: &[AbiValue]) -> Result<String> {
        if types.len() != values.len() {
            return Err(AbiError::LengthMismatch {
                types: types.len(),
                values: values.len(),
            });
        }

        let words = types
            .iter()
            .zip(values)
            .map(|(declared, value)| {
                let declared = declared.as_ref();
                self.require_type(declared)?
                    .format_input(value, is_array(declared))
            })
            .collect::<Result<Vec<Word>>>()?;

        Ok(Word::encode_list(&words))
    }

    pub fn decode_param(&self, declared: &str, blob: &str) -> Result<AbiValue> {
        self.decode_params(&[declared], blob)?
            .pop()
            .ok_or_else(|| AbiError::UnsupportedType(declared.to_string()))
    }

    /// Decode an argument list. Position `i` is always head slot `i`, even
    /// after dynamic parameters.
    pub fn decode_params<S: AsRef<str>>(&self, types: &[S], blob: &str) -> Result<Vec<AbiValue>> {
        let blob = strip_0x(blob);
        types
            .iter()
            .enumerate()
            .map(|(index, declared)| {
                let declared = declared.as_ref();
                let ty = self.require_type(declared)?;
                let word = ty.slice_param(blob, index, declared)?;
                ty.format_output(&word, is_array(declared))
            })
            .collect()
    }

    /// Parse text input for the declared type. Arrays use `[a,b,c]`.
    pub fn parse_value(&self, declared: &str, text: &str) -> Result<AbiValue> {
        let ty = self.require_type(declared)?;
        if is_array(declared) {
            let inner = text
                .trim()
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| parse_error(declared, text, "array must be enclosed in brackets"))?;
            if inner.trim().is_empty() {
                return Ok(AbiValue::Array(Vec::new()));
            }
            let element = declared.trim_end_matches("[]");
            return inner
                .split(',')
                .map(|item| parse_scalar(ty.family, element, item.trim()))
                .collect::<Result<Vec<_>>>()
                .map(AbiValue::Array);
        }
        parse_scalar(ty.family, declared, text.trim())
    }
}

fn parse_error(ty: &str, text: &str, reason: impl ToString) -> AbiError {
    AbiError::Parse {
        ty: ty.to_string(),
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_scalar(family: TypeFamily, declared: &str, text: &str) -> Result<AbiValue> {
    match family {
        TypeFamily::Address => Address::from_str(text)
            .map(AbiValue::Address)
            .map_err(|e| parse_error(declared, text, e)),

        TypeFamily::Bool => match text.to_lowercase().as_str() {
            "true" | "1" => Ok(AbiValue::Bool(true)),
            "false" | "0" => Ok(AbiValue::Bool(false)),
            _ => Err(parse_error(declared, text, "expected true/false")),
        },

        TypeFamily::Int => {
            if text.starts_with("0x") || text.starts_with("0X") {
                U256::from_str_radix(strip_0x(text), 16)
                    .map(|raw| AbiValue::Int(I256::from_raw(raw)))
                    .map_err(|e| parse_error(declared, text, e))
            } else {
                I256::from_dec_str(text)
                    .map(AbiValue::Int)
                    .map_err(|e| parse_error(declared, text, e))
            }
        }

        TypeFamily::Uint => {
            let parsed = if text.starts_with("0x") || text.starts_with("0X") {
                U256::from_str_radix(strip_0x(text), 16)
            } else {
                U256::from_str_radix(text, 10)
            };
            parsed
                .map(AbiValue::Uint)
                .map_err(|e| parse_error(declared, text, e))
        }

        TypeFamily::Bytes | TypeFamily::DynamicBytes => {
            let unquoted = if (text.starts_with('"') && text.ends_with('"') && text.len() >= 2)
                || (text.starts_with('\'') && text.ends_with('\'') && text.len() >= 2)
            {
                &text[1..text.len() - 1]
            } else {
                text
            };
            Ok(AbiValue::Bytes(unquoted.to_string()))
        }

        TypeFamily::Real | TypeFamily::Ureal => FixedPoint::from_str(text)
            .map(AbiValue::Fixed)
            .map_err(|e| parse_error(declared, text, e)),
    }
}
