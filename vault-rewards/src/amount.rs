//! Exact fixed-point token amounts.
//!
//! A [`FixedPointAmount`] pairs a 256-bit raw integer with the decimal scale
//! of its token (6 for USDC, 8 for WBTC, 18 for most ERC-20s). Every money
//! value in the crate lives in this type; the only way out into floating
//! point is [`FixedPointAmount::to_display_f64`], which is meant for final
//! display math and never feeds back into ledger arithmetic.
//!
//! Amounts of different scales never mix implicitly. Adding, subtracting or
//! comparing across scales yields [`AmountError::ScaleMismatch`]; converting
//! between scales is an explicit [`FixedPointAmount::rescale`].

use std::cmp::Ordering;
use std::fmt;

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error types for exact amount arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Operands carry different decimal scales
    #[error("Scale mismatch: {left} decimals vs {right} decimals")]
    ScaleMismatch { left: u8, right: u8 },

    /// Result does not fit in 256 bits
    #[error("Amount overflow")]
    Overflow,

    /// Subtraction went below zero
    #[error("Amount underflow")]
    Underflow,

    /// Division by a zero amount
    #[error("Division by zero")]
    DivisionByZero,
}

/// Error types for converting user-entered decimal strings.
///
/// `Overflow` is the bounded-result case: the value is well formed but does
/// not fit the representable range. Callers decide how to surface it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    /// Nothing to parse
    #[error("Empty amount")]
    Empty,

    /// Anything other than ASCII digits and a single decimal point
    #[error("Invalid character '{0}' in amount")]
    InvalidCharacter(char),

    /// More than one '.'
    #[error("Amount contains more than one decimal point")]
    MultipleDecimalPoints,

    /// More significant fractional digits than the token supports
    #[error("Too many fractional digits: {found} exceeds {scale} decimals")]
    TooManyDecimals { scale: u8, found: usize },

    /// Well formed but outside the 256-bit range
    #[error("Amount exceeds representable range")]
    Overflow,
}

/// A token quantity as an exact integer of base units plus its decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FixedPointAmount {
    /// Base units, serialized as a decimal integer string
    #[serde(with = "decimal_string")]
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    raw: U256,
    /// Number of fractional decimal digits
    scale: u8,
}

impl FixedPointAmount {
    /// Wrap raw base units at the given scale.
    pub const fn new(raw: U256, scale: u8) -> Self {
        Self { raw, scale }
    }

    /// Zero at the given scale.
    pub fn zero(scale: u8) -> Self {
        Self::new(U256::zero(), scale)
    }

    /// Raw base units from a machine integer (no decimal shifting).
    pub fn from_base_units(units: u64, scale: u8) -> Self {
        Self::new(U256::from(units), scale)
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Parse a human decimal string ("1.25", ".5", "100") into base units.
    ///
    /// Trailing fractional zeros beyond the scale are accepted since they
    /// carry no value. Signs, exponents and separators are rejected.
    pub fn parse(input: &str, scale: u8) -> Result<Self, ParseAmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseAmountError::Empty);
        }

        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if fraction.contains('.') {
            return Err(ParseAmountError::MultipleDecimalPoints);
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseAmountError::Empty);
        }
        if let Some(c) = whole.chars().chain(fraction.chars()).find(|c| !c.is_ascii_digit()) {
            return Err(ParseAmountError::InvalidCharacter(c));
        }

        let fraction = fraction.trim_end_matches('0');
        let scale_len = scale as usize;
        if fraction.len() > scale_len {
            return Err(ParseAmountError::TooManyDecimals {
                scale,
                found: fraction.len(),
            });
        }

        let mut digits = String::with_capacity(whole.len() + scale_len);
        digits.push_str(whole);
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(scale_len - fraction.len()));

        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::zero(scale));
        }

        let raw = U256::from_dec_str(digits).map_err(|_| ParseAmountError::Overflow)?;
        Ok(Self::new(raw, scale))
    }

    /// Convert to `f64` for display-only math (percentages, quote values).
    pub fn to_display_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    fn ensure_same_scale(&self, other: &Self) -> Result<(), AmountError> {
        if self.scale == other.scale {
            Ok(())
        } else {
            Err(AmountError::ScaleMismatch {
                left: self.scale,
                right: other.scale,
            })
        }
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, AmountError> {
        self.ensure_same_scale(other)?;
        let raw = self.raw.checked_add(other.raw).ok_or(AmountError::Overflow)?;
        Ok(Self::new(raw, self.scale))
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, AmountError> {
        self.ensure_same_scale(other)?;
        let raw = self.raw.checked_sub(other.raw).ok_or(AmountError::Underflow)?;
        Ok(Self::new(raw, self.scale))
    }

    /// Total order between amounts of the same scale.
    pub fn checked_cmp(&self, other: &Self) -> Result<Ordering, AmountError> {
        self.ensure_same_scale(other)?;
        Ok(self.raw.cmp(&other.raw))
    }

    /// `self * numerator / denominator` with a 512-bit intermediate,
    /// truncating toward zero. The scale is preserved.
    pub fn mul_div(&self, numerator: U256, denominator: U256) -> Result<Self, AmountError> {
        if denominator.is_zero() {
            return Err(AmountError::DivisionByZero);
        }
        let quotient = self.raw.full_mul(numerator) / U512::from(denominator);
        let raw = U256::try_from(quotient).map_err(|_| AmountError::Overflow)?;
        Ok(Self::new(raw, self.scale))
    }

    /// Express the amount at another scale.
    ///
    /// Upscaling is exact (or overflows); downscaling truncates.
    pub fn rescale(&self, scale: u8) -> Result<Self, AmountError> {
        match scale.cmp(&self.scale) {
            Ordering::Equal => Ok(*self),
            Ordering::Greater => {
                let factor = pow10(scale - self.scale).ok_or(AmountError::Overflow)?;
                let raw = self.raw.checked_mul(factor).ok_or(AmountError::Overflow)?;
                Ok(Self::new(raw, scale))
            }
            Ordering::Less => {
                // A divisor wider than 256 bits leaves nothing behind.
                let raw = match pow10(self.scale - scale) {
                    Some(factor) => self.raw / factor,
                    None => U256::zero(),
                };
                Ok(Self::new(raw, scale))
            }
        }
    }

    /// Raw units expressed at a scale at least as fine as this one, widened
    /// to 512 bits so callers can combine amounts without losing precision.
    pub(crate) fn widened_at(&self, scale: u8) -> Result<U512, AmountError> {
        let shift = scale.checked_sub(self.scale).ok_or(AmountError::ScaleMismatch {
            left: self.scale,
            right: scale,
        })?;
        let factor = pow10_wide(shift).ok_or(AmountError::Overflow)?;
        U512::from(self.raw)
            .checked_mul(factor)
            .ok_or(AmountError::Overflow)
    }
}

impl PartialOrd for FixedPointAmount {
    /// Amounts of different scales are incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.scale == other.scale).then(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for FixedPointAmount {
    /// Canonical decimal form: no leading zeros, no trailing fractional zeros,
    /// no trailing point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.raw.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }

        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            f.write_str(whole)
        } else {
            write!(f, "{}.{}", whole, fraction)
        }
    }
}

/// 10^exp, or `None` past 256 bits.
pub(crate) fn pow10(exp: u8) -> Option<U256> {
    let ten = U256::from(10u64);
    (0..exp).try_fold(U256::one(), |acc, _| acc.checked_mul(ten))
}

fn pow10_wide(exp: u8) -> Option<U512> {
    let ten = U512::from(10u64);
    (0..exp).try_fold(U512::one(), |acc, _| acc.checked_mul(ten))
}

/// Serde adapter: raw units travel as decimal integer strings, the same
/// shape subgraph responses use for `BigInt` fields.
mod decimal_string {
    use primitive_types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s)
            .map_err(|e| D::Error::custom(format!("invalid raw amount {:?}: {:?}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        let amount = FixedPointAmount::parse("1.5", 6).unwrap();
        assert_eq!(amount.raw(), U256::from(1_500_000u64));
        assert_eq!(amount.scale(), 6);

        let amount = FixedPointAmount::parse(".25", 2).unwrap();
        assert_eq!(amount.raw(), U256::from(25u64));

        let amount = FixedPointAmount::parse("42.", 0).unwrap();
        assert_eq!(amount.raw(), U256::from(42u64));

        let amount = FixedPointAmount::parse("  1000  ", 18).unwrap();
        assert_eq!(amount.to_string(), "1000");
    }

    #[test]
    fn test_parse_zero_forms() {
        assert!(FixedPointAmount::parse("0", 18).unwrap().is_zero());
        assert!(FixedPointAmount::parse("0.000", 6).unwrap().is_zero());
        assert!(FixedPointAmount::parse("000", 8).unwrap().is_zero());
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(FixedPointAmount::parse("", 6), Err(ParseAmountError::Empty));
        assert_eq!(FixedPointAmount::parse("   ", 6), Err(ParseAmountError::Empty));
        assert_eq!(FixedPointAmount::parse(".", 6), Err(ParseAmountError::Empty));
        assert_eq!(
            FixedPointAmount::parse("-1", 6),
            Err(ParseAmountError::InvalidCharacter('-'))
        );
        assert_eq!(
            FixedPointAmount::parse("1e5", 6),
            Err(ParseAmountError::InvalidCharacter('e'))
        );
        assert_eq!(
            FixedPointAmount::parse("1.2.3", 6),
            Err(ParseAmountError::MultipleDecimalPoints)
        );
    }

    #[test]
    fn test_parse_too_many_decimals() {
        assert_eq!(
            FixedPointAmount::parse("1.1234567", 6),
            Err(ParseAmountError::TooManyDecimals { scale: 6, found: 7 })
        );
        // Trailing zeros carry no value
        assert!(FixedPointAmount::parse("1.1234560000", 6).is_ok());
    }

    #[test]
    fn test_parse_overflow_is_explicit() {
        let huge = format!("1{}", "0".repeat(80));
        assert_eq!(
            FixedPointAmount::parse(&huge, 0),
            Err(ParseAmountError::Overflow)
        );

        // Fits as an integer but not once shifted by 18 decimals
        let near_max = "1".repeat(70);
        assert_eq!(
            FixedPointAmount::parse(&near_max, 18),
            Err(ParseAmountError::Overflow)
        );

        let max = U256::MAX.to_string();
        assert_eq!(FixedPointAmount::parse(&max, 0).unwrap().raw(), U256::MAX);
    }

    #[test]
    fn test_display_round_trip() {
        let cases = [
            ("0", 6),
            ("1", 6),
            ("0.000001", 6),
            ("123.456", 6),
            ("99999999.99999999", 8),
            ("1000000000000000000000", 18),
            ("0.000000000000000001", 18),
            ("7", 0),
        ];
        for (input, scale) in cases {
            let amount = FixedPointAmount::parse(input, scale).unwrap();
            assert_eq!(amount.to_string(), input, "scale {}", scale);
            assert_eq!(FixedPointAmount::parse(&amount.to_string(), scale).unwrap(), amount);
        }
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        let amount = FixedPointAmount::from_base_units(1_500_000, 6);
        assert_eq!(amount.to_string(), "1.5");
        let amount = FixedPointAmount::from_base_units(5, 6);
        assert_eq!(amount.to_string(), "0.000005");
    }

    #[test]
    fn test_add_and_sub() {
        let a = FixedPointAmount::parse("100", 6).unwrap();
        let b = FixedPointAmount::parse("50.5", 6).unwrap();

        assert_eq!(a.checked_add(&b).unwrap().to_string(), "150.5");
        assert_eq!(a.checked_sub(&b).unwrap().to_string(), "49.5");
        assert_eq!(b.checked_sub(&a), Err(AmountError::Underflow));

        let max = FixedPointAmount::new(U256::MAX, 0);
        let one = FixedPointAmount::from_base_units(1, 0);
        assert_eq!(max.checked_add(&one), Err(AmountError::Overflow));
    }

    #[test]
    fn test_scale_mismatch_fails_fast() {
        let usdc = FixedPointAmount::parse("1", 6).unwrap();
        let weth = FixedPointAmount::parse("1", 18).unwrap();

        assert_eq!(
            usdc.checked_add(&weth),
            Err(AmountError::ScaleMismatch { left: 6, right: 18 })
        );
        assert!(usdc.checked_cmp(&weth).is_err());
        assert_eq!(usdc.partial_cmp(&weth), None);
        assert_ne!(usdc, weth);
    }

    #[test]
    fn test_mul_div_truncates() {
        let amount = FixedPointAmount::from_base_units(1000, 0);
        let result = amount.mul_div(U256::from(365u64), U256::from(1460u64)).unwrap();
        assert_eq!(result.raw(), U256::from(250u64));

        let result = amount.mul_div(U256::from(1u64), U256::from(3u64)).unwrap();
        assert_eq!(result.raw(), U256::from(333u64));

        assert_eq!(
            amount.mul_div(U256::one(), U256::zero()),
            Err(AmountError::DivisionByZero)
        );
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // MAX * 3 / 3 only works with a 512-bit intermediate
        let max = FixedPointAmount::new(U256::MAX, 0);
        let result = max.mul_div(U256::from(3u64), U256::from(3u64)).unwrap();
        assert_eq!(result.raw(), U256::MAX);

        assert_eq!(
            max.mul_div(U256::from(2u64), U256::one()),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_rescale() {
        let usdc = FixedPointAmount::parse("12.345678", 6).unwrap();

        let up = usdc.rescale(18).unwrap();
        assert_eq!(up.to_string(), "12.345678");
        assert_eq!(up.scale(), 18);

        let down = usdc.rescale(2).unwrap();
        assert_eq!(down.to_string(), "12.34");

        let max = FixedPointAmount::new(U256::MAX, 0);
        assert_eq!(max.rescale(1), Err(AmountError::Overflow));
    }

    #[test]
    fn test_display_f64_conversion() {
        let amount = FixedPointAmount::parse("1234.5", 8).unwrap();
        assert!((amount.to_display_f64() - 1234.5).abs() < 1e-9);
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let amount = FixedPointAmount::parse("1.5", 6).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#"{"raw":"1500000","scale":6}"#);

        let back: FixedPointAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);

        assert!(serde_json::from_str::<FixedPointAmount>(r#"{"raw":"0x10","scale":6}"#).is_err());
    }
}
