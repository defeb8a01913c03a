//! 32-byte ABI slots and head/tail layout
//!
//! A [`Word`] holds hex text (no `0x`) for one encoded parameter. Values
//! longer than one slot, or carrying an explicit offset, are dynamic: their
//! head slot holds the offset and their payload goes to the tail region.

use super::error::{AbiError, Result};

/// Size of one ABI slot in bytes
pub const WORD_BYTES: usize = 32;

/// Size of one ABI slot in hex characters
pub const WORD_HEX_LEN: usize = WORD_BYTES * 2;

/// One encoded parameter: a hex payload and an optional tail offset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    value: String,
    offset: Option<usize>,
}

impl Word {
    /// Create a word with no offset
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            offset: None,
        }
    }

    /// Raw hex payload
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Declared byte offset into the tail region, if any
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Same payload with the given offset
    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            value: self.value.clone(),
            offset: Some(offset),
        }
    }

    /// Concatenate two payloads; the result carries no offset
    pub fn combine(&self, other: &Word) -> Self {
        Self::new(format!("{}{}", self.value, other.value))
    }

    pub fn is_dynamic(&self) -> bool {
        self.value.len() > WORD_HEX_LEN || self.offset.is_some()
    }

    /// Head slot: the payload itself for static words, the encoded offset
    /// for dynamic ones. Empty while a dynamic word has no offset yet.
    pub fn static_part(&self) -> String {
        if !self.is_dynamic() {
            return self.value.clone();
        }
        match self.offset {
            Some(offset) => encode_usize(offset),
            None => String::new(),
        }
    }

    /// Tail payload; empty for static words
    pub fn dynamic_part(&self) -> &str {
        if self.is_dynamic() {
            &self.value
        } else {
            ""
        }
    }

    pub fn encode(&self) -> String {
        format!("{}{}", self.static_part(), self.dynamic_part())
    }

    /// Tail size in bytes
    pub fn dynamic_part_length(&self) -> usize {
        self.dynamic_part().len() / 2
    }

    /// Lay out one argument list: all head slots first, then every dynamic
    /// payload in order, with offsets counted from the start of the block.
    pub fn encode_list(words: &[Word]) -> String {
        let mut total_offset = words.len() * WORD_BYTES;

        let placed: Vec<Word> = words
            .iter()
            .map(|word| {
                if !word.is_dynamic() {
                    return word.clone();
                }
                let placed = word.with_offset(total_offset);
                total_offset += placed.dynamic_part_length();
                placed
            })
            .collect();

        let mut out = String::with_capacity(total_offset * 2);
        for word in &placed {
            out.push_str(&word.static_part());
        }
        for word in &placed {
            out.push_str(word.dynamic_part());
        }
        out
    }

    /// The head slot at `index`
    pub fn decode_param(blob: &str, index: usize) -> Result<Word> {
        let start = index * WORD_HEX_LEN;
        Ok(Word::new(slice(blob, start, start + WORD_HEX_LEN)?))
    }

    /// Length word plus the payload words it covers, read through the
    /// offset stored in head slot `index`
    pub fn decode_bytes(blob: &str, index: usize) -> Result<Word> {
        let (start, length) = tail_header(blob, index)?;
        let payload_words = length.div_ceil(WORD_BYTES);
        let end = tail_end(blob, start, payload_words)?;
        Ok(Word::new(slice(blob, start, end)?).with_offset(0))
    }

    /// Length word plus one slot per element, read through the offset
    /// stored in head slot `index`
    pub fn decode_array(blob: &str, index: usize) -> Result<Word> {
        let (start, length) = tail_header(blob, index)?;
        let end = tail_end(blob, start, length)?;
        Ok(Word::new(slice(blob, start, end)?).with_offset(0))
    }
}

fn head_offset(blob: &str, index: usize) -> Result<usize> {
    let start = index.checked_mul(WORD_HEX_LEN).ok_or_else(|| overflow(blob))?;
    word_to_usize(slice(blob, start, start.saturating_add(WORD_HEX_LEN))?)
}

/// Hex position of the length word and the length it holds
fn tail_header(blob: &str, index: usize) -> Result<(usize, usize)> {
    let start = head_offset(blob, index)?
        .checked_mul(2)
        .ok_or_else(|| overflow(blob))?;
    let length = word_to_usize(slice(blob, start, start.saturating_add(WORD_HEX_LEN))?)?;
    Ok((start, length))
}

/// End of a length word followed by `slots` slots
fn tail_end(blob: &str, start: usize, slots: usize) -> Result<usize> {
    slots
        .checked_add(1)
        .and_then(|n| n.checked_mul(WORD_HEX_LEN))
        .and_then(|n| n.checked_add(start))
        .ok_or_else(|| overflow(blob))
}

fn overflow(blob: &str) -> AbiError {
    AbiError::OutOfBounds {
        start: usize::MAX,
        end: usize::MAX,
        len: blob.len(),
    }
}

fn slice(blob: &str, start: usize, end: usize) -> Result<&str> {
    blob.get(start..end).ok_or(AbiError::OutOfBounds {
        start,
        end,
        len: blob.len(),
    })
}

/// Right-aligned 32-byte big-endian encoding of a small integer
pub(crate) fn encode_usize(value: usize) -> String {
    format!("{:0>64x}", value)
}

/// Read a big-endian slot as an offset or length
pub(crate) fn word_to_usize(word: &str) -> Result<usize> {
    let digits = word.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 16 {
        return Err(AbiError::InvalidHex(format!(
            "slot value 0x{digits} is too large for an offset"
        )));
    }
    let value = u64::from_str_radix(digits, 16).map_err(|e| AbiError::InvalidHex(e.to_string()))?;
    usize::try_from(value).map_err(|e| AbiError::InvalidHex(e.to_string()))
}
