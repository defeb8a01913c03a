//! Solidity type descriptors and the first-match-wins registry

use super::error::{AbiError, Result};
use super::formatters::*;
use super::value::AbiValue;
use super::word::{word_to_usize, Word, WORD_HEX_LEN};

/// How a descriptor name is compared against a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact name, or the name followed by `[]`
    Strict,
    /// Any declared type starting with the name (`uint8`, `bytes32`, ...)
    Prefix,
}

/// How a parameter is cut out of an encoded blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Value,
    Bytes,
}

/// Formatter family of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Address,
    Bool,
    Int,
    Uint,
    DynamicBytes,
    Bytes,
    Real,
    Ureal,
}

/// One entry of the type registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidityType {
    pub name: &'static str,
    pub match_mode: MatchMode,
    pub storage_mode: StorageMode,
    pub family: TypeFamily,
}

impl SolidityType {
    pub const fn new(
        name: &'static str,
        match_mode: MatchMode,
        storage_mode: StorageMode,
        family: TypeFamily,
    ) -> Self {
        Self {
            name,
            match_mode,
            storage_mode,
            family,
        }
    }

    pub fn is_type(&self, declared: &str) -> bool {
        match self.match_mode {
            MatchMode::Strict => {
                declared == self.name
                    || declared
                        .strip_prefix(self.name)
                        .is_some_and(|suffix| suffix == "[]")
            }
            MatchMode::Prefix => declared.starts_with(self.name),
        }
    }

    fn input(&self, value: &AbiValue) -> Result<Word> {
        match self.family {
            TypeFamily::Address => format_input_address(value),
            TypeFamily::Bool => format_input_bool(value),
            TypeFamily::Int | TypeFamily::Uint => format_input_int(value),
            TypeFamily::DynamicBytes => format_input_dynamic_bytes(value),
            TypeFamily::Bytes => format_input_bytes(value),
            TypeFamily::Real => format_input_real(value),
            TypeFamily::Ureal => format_input_ureal(value),
        }
    }

    fn output(&self, word: &Word) -> Result<AbiValue> {
        match self.family {
            TypeFamily::Address => format_output_address(word),
            TypeFamily::Bool => format_output_bool(word),
            TypeFamily::Int => format_output_int(word),
            TypeFamily::Uint => format_output_uint(word),
            TypeFamily::DynamicBytes => format_output_dynamic_bytes(word),
            TypeFamily::Bytes => format_output_bytes(word),
            TypeFamily::Real => format_output_real(word),
            TypeFamily::Ureal => format_output_ureal(word),
        }
    }

    /// Encode one argument. Arrays become a length word plus one slot per
    /// element, forced dynamic.
    pub fn format_input(&self, value: &AbiValue, array_type: bool) -> Result<Word> {
        match value {
            AbiValue::Array(items) if array_type => {
                let length = format_input_int(&AbiValue::from(items.len() as u64))?;
                let combined = items.iter().try_fold(length, |acc, item| {
                    Ok::<_, AbiError>(acc.combine(&self.input(item)?))
                })?;
                Ok(combined.with_offset(32))
            }
            _ => self.input(value),
        }
    }

    /// Decode one argument. Arrays are assumed short; every element is
    /// decoded from its own slot after the length word.
    pub fn format_output(&self, word: &Word, array_type: bool) -> Result<AbiValue> {
        if !array_type {
            return self.output(word);
        }
        let tail = word.dynamic_part();
        let length_word = tail.get(..WORD_HEX_LEN).ok_or(AbiError::OutOfBounds {
            start: 0,
            end: WORD_HEX_LEN,
            len: tail.len(),
        })?;
        let length = word_to_usize(length_word)?;

        (0..length)
            .map(|i| {
                let start = (i + 1) * WORD_HEX_LEN;
                let element = tail.get(start..start + WORD_HEX_LEN).ok_or(AbiError::OutOfBounds {
                    start,
                    end: start + WORD_HEX_LEN,
                    len: tail.len(),
                })?;
                self.output(&Word::new(element))
            })
            .collect::<Result<Vec<_>>>()
            .map(AbiValue::Array)
    }

    /// Cut the parameter at head slot `index` out of `blob`
    pub fn slice_param(&self, blob: &str, index: usize, declared: &str) -> Result<Word> {
        if self.storage_mode == StorageMode::Bytes {
            Word::decode_bytes(blob, index)
        } else if is_array(declared) {
            Word::decode_array(blob, index)
        } else {
            Word::decode_param(blob, index)
        }
    }
}

/// True when the declared type carries a trailing `[]`
pub fn is_array(declared: &str) -> bool {
    declared.ends_with("[]")
}

/// Canonical registration order; first match wins
pub const DEFAULT_TYPES: [SolidityType; 9] = [
    SolidityType::new("address", MatchMode::Strict, StorageMode::Value, TypeFamily::Address),
    SolidityType::new("bool", MatchMode::Strict, StorageMode::Value, TypeFamily::Bool),
    SolidityType::new("int", MatchMode::Prefix, StorageMode::Value, TypeFamily::Int),
    SolidityType::new("uint", MatchMode::Prefix, StorageMode::Value, TypeFamily::Uint),
    SolidityType::new("bytes", MatchMode::Strict, StorageMode::Bytes, TypeFamily::DynamicBytes),
    SolidityType::new("bytes", MatchMode::Prefix, StorageMode::Value, TypeFamily::Bytes),
    SolidityType::new("real", MatchMode::Prefix, StorageMode::Value, TypeFamily::Real),
    SolidityType::new("ureal", MatchMode::Prefix, StorageMode::Value, TypeFamily::Ureal),
    SolidityType::new("string", MatchMode::Strict, StorageMode::Bytes, TypeFamily::DynamicBytes),
];
