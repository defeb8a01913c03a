//! Codec error type

use thiserror::Error;

/// Errors raised while encoding or decoding ABI values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// No registered type descriptor matches the declared type
    #[error("invalid solidity type: {0}")]
    UnsupportedType(String),

    /// The value kind does not fit the type family
    #[error("invalid value for {expected}: got {found}")]
    InvalidValue {
        expected: &'static str,
        found: &'static str,
    },

    /// Input was not valid hex
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A slice reached past the end of the encoded blob
    #[error("slice {start}..{end} out of bounds for blob of {len} hex chars")]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// Fixed-length bytes longer than the padding width
    #[error("value of {len} bytes does not fit in {max} bytes")]
    ValueTooLong { max: usize, len: usize },

    /// Type list and value list differ in length
    #[error("expected {types} values, got {values}")]
    LengthMismatch { types: usize, values: usize },

    /// A fixed-point decimal could not be parsed or does not fit
    #[error("invalid fixed-point value: {0}")]
    InvalidFixed(String),

    /// A function or event signature could not be parsed
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Text input could not be parsed into a value of the declared type
    #[error("cannot parse '{text}' as {ty}: {reason}")]
    Parse {
        ty: String,
        text: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AbiError>;
