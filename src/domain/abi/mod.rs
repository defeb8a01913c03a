//! Solidity ABI codec
//!
//! Values are turned into 32-byte [`Word`]s by the formatter of the first
//! registered [`SolidityType`] matching the declared type string, then laid
//! out head-first by [`Word::encode_list`].

mod coder;
mod error;
mod fixed;
pub mod formatters;
mod function;
mod types;
mod value;
mod word;

pub use coder::AbiCoder;
pub use error::AbiError;
pub use fixed::{FixedPoint, FRACTION_BITS};
pub use function::{
    decode_event_log, decode_function_output, encode_call, encode_function_call, event_topic,
    normalize_signature, parse_signature, selector,
};
pub use types::{is_array, MatchMode, SolidityType, StorageMode, TypeFamily, DEFAULT_TYPES};
pub use value::AbiValue;
pub use word::{Word, WORD_BYTES, WORD_HEX_LEN};
