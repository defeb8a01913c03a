//! Fixed-point numbers with 128 fractional bits (`real` / `ureal`)

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{I256, U256};

use super::error::AbiError;

/// Number of fractional bits in the on-chain representation
pub const FRACTION_BITS: usize = 128;

/// Longest fractional part accepted when parsing; 10^38 * 2^128 still fits in 256 bits
const MAX_FRACTION_DIGITS: usize = 38;

/// A decimal stored exactly as `magnitude / 2^128` with a sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    negative: bool,
    magnitude: U256,
}

impl FixedPoint {
    /// Build from the scaled two's-complement integer used by `real`
    pub fn from_signed_raw(raw: I256) -> Self {
        Self {
            negative: raw.is_negative(),
            magnitude: raw.unsigned_abs(),
        }
    }

    /// Build from the scaled unsigned integer used by `ureal`
    pub fn from_unsigned_raw(raw: U256) -> Self {
        Self {
            negative: false,
            magnitude: raw,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }

    /// Scaled value as a signed integer
    pub fn to_signed_raw(&self) -> Result<I256, AbiError> {
        let value = I256::try_from(self.magnitude)
            .map_err(|_| AbiError::InvalidFixed(format!("{self} overflows int256")))?;
        Ok(if self.negative { -value } else { value })
    }

    /// Scaled value as an unsigned integer; fails for negative values
    pub fn to_unsigned_raw(&self) -> Result<U256, AbiError> {
        if self.is_negative() {
            return Err(AbiError::InvalidFixed(format!("{self} is negative")));
        }
        Ok(self.magnitude)
    }

    fn fraction_mask() -> U256 {
        (U256::from(1u8) << FRACTION_BITS) - U256::from(1u8)
    }
}

impl From<i64> for FixedPoint {
    fn from(value: i64) -> Self {
        Self {
            negative: value < 0,
            magnitude: U256::from(value.unsigned_abs()) << FRACTION_BITS,
        }
    }
}

impl FromStr for FixedPoint {
    type Err = AbiError;

    /// Parse a decimal like `-12.375`; digits past the supported precision
    /// are dropped, rounding toward zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_text, frac_text) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |t: &str| t.chars().all(|c| c.is_ascii_digit());
        if (int_text.is_empty() && frac_text.is_empty()) || !all_digits(int_text) || !all_digits(frac_text) {
            return Err(AbiError::InvalidFixed(s.to_string()));
        }

        let integer = if int_text.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int_text, 10).map_err(|e| AbiError::InvalidFixed(e.to_string()))?
        };
        if integer >> FRACTION_BITS != U256::ZERO {
            return Err(AbiError::InvalidFixed(format!("{s} has too many integer digits")));
        }

        let frac_text = &frac_text[..frac_text.len().min(MAX_FRACTION_DIGITS)];
        let fraction = if frac_text.is_empty() {
            U256::ZERO
        } else {
            let numerator = U256::from_str_radix(frac_text, 10)
                .map_err(|e| AbiError::InvalidFixed(e.to_string()))?;
            let denominator = U256::from(10u8).pow(U256::from(frac_text.len()));
            (numerator << FRACTION_BITS) / denominator
        };

        Ok(Self {
            negative,
            magnitude: (integer << FRACTION_BITS) | fraction,
        })
    }
}

impl fmt::Display for FixedPoint {
    /// Exact decimal expansion; every binary fraction terminates
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let integer = self.magnitude >> FRACTION_BITS;
        let mut remainder = self.magnitude & Self::fraction_mask();
        write!(f, "{integer}")?;

        if remainder.is_zero() {
            return Ok(());
        }
        f.write_str(".")?;
        let ten = U256::from(10u8);
        while !remainder.is_zero() {
            remainder *= ten;
            let digit = remainder >> FRACTION_BITS;
            remainder &= Self::fraction_mask();
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_exact() {
        for text in ["0", "1", "1.5", "-0.25", "3.125", "-42", "0.0078125"] {
            let value: FixedPoint = text.parse().unwrap();
            assert_eq!(value.to_string(), text);
        }
    }

    #[test]
    fn test_scaled_representation() {
        let value: FixedPoint = "1.5".parse().unwrap();
        let expected = U256::from(3u8) << (FRACTION_BITS - 1);
        assert_eq!(value.to_unsigned_raw().unwrap(), expected);
    }

    #[test]
    fn test_negative_roundtrip_through_raw() {
        let value: FixedPoint = "-2.75".parse().unwrap();
        let raw = value.to_signed_raw().unwrap();
        assert!(raw.is_negative());
        assert_eq!(FixedPoint::from_signed_raw(raw), value);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("abc".parse::<FixedPoint>().is_err());
        assert!("1.2.3".parse::<FixedPoint>().is_err());
        assert!(".".parse::<FixedPoint>().is_err());
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        let value: FixedPoint = "-1".parse().unwrap();
        assert!(value.to_unsigned_raw().is_err());
    }
}
