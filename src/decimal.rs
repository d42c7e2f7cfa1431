//! Arbitrary-precision fixed-point decimal (spec §3, "Decimal").
//!
//! Represented as `coefficient * 10^exponent`, stripped down to what script
//! syntax can actually produce: there is no script-level literal syntax for
//! NaN or Infinity, so this type carries no special-value tag.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i32,
}

impl Decimal {
    #[must_use]
    pub fn new(coefficient: BigInt, exponent: i32) -> Self {
        Self { coefficient, exponent }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self { coefficient: BigInt::zero(), exponent: 0 }
    }

    pub fn from_i64(value: i64) -> Self {
        Self { coefficient: BigInt::from(value), exponent: 0 }
    }

    /// Parses a decimal literal like `"19.99"` or `"-3"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let negative = text.starts_with('-');
        let unsigned = text.trim_start_matches(['-', '+']);
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let digits = format!("{int_part}{frac_part}");
        let digits = if digits.is_empty() { "0" } else { &digits };
        let mut coefficient: BigInt = digits.parse().ok()?;
        if negative {
            coefficient = -coefficient;
        }
        Some(Self { coefficient, exponent: -(frac_part.len() as i32) })
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let base = self.coefficient.to_f64().unwrap_or(0.0);
        base * 10f64.powi(self.exponent)
    }

    fn align(a: &Self, b: &Self) -> (BigInt, BigInt, i32) {
        if a.exponent == b.exponent {
            return (a.coefficient.clone(), b.coefficient.clone(), a.exponent);
        }
        if a.exponent > b.exponent {
            let scale = BigInt::from(10).pow((a.exponent - b.exponent) as u32);
            (&a.coefficient * scale, b.coefficient.clone(), b.exponent)
        } else {
            let scale = BigInt::from(10).pow((b.exponent - a.exponent) as u32);
            (a.coefficient.clone(), &b.coefficient * scale, a.exponent)
        }
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let (a, b, exponent) = Self::align(self, other);
        Self { coefficient: a + b, exponent }
    }

    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        let (a, b, exponent) = Self::align(self, other);
        Self { coefficient: a - b, exponent }
    }

    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            coefficient: &self.coefficient * &other.coefficient,
            exponent: self.exponent + other.exponent,
        }
    }

    /// Divides to a fixed `scale` fractional digits (spec: division needs an
    /// explicit precision since the result may be non-terminating).
    #[must_use]
    pub fn div(&self, other: &Self, scale: i32) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let shift = scale - (self.exponent - other.exponent);
        let numerator = if shift >= 0 {
            &self.coefficient * BigInt::from(10).pow(shift as u32)
        } else {
            self.coefficient.clone()
        };
        let denominator = if shift < 0 {
            &other.coefficient * BigInt::from(10).pow((-shift) as u32)
        } else {
            other.coefficient.clone()
        };
        let quotient = numerator.div_floor(&denominator);
        Some(Self { coefficient: quotient, exponent: -scale })
    }

    #[must_use]
    pub fn floor_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let (a, b, _) = Self::align(self, other);
        Some(Self { coefficient: a.div_floor(&b), exponent: 0 })
    }

    #[must_use]
    pub fn rem(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let (a, b, exponent) = Self::align(self, other);
        Some(Self { coefficient: a.mod_floor(&b), exponent })
    }

    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self { coefficient: self.coefficient.pow(exp), exponent: self.exponent * exp as i32 }
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        Self { coefficient: -&self.coefficient, exponent: self.exponent }
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let (a, b, _) = Self::align(self, other);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent >= 0 {
            let scaled = &self.coefficient * BigInt::from(10).pow(self.exponent as u32);
            return write!(f, "{scaled}");
        }
        let digits = self.coefficient.abs().to_string();
        let frac_len = (-self.exponent) as usize;
        let sign = if self.coefficient.is_negative() { "-" } else { "" };
        if digits.len() <= frac_len {
            let padded = format!("{:0>width$}", digits, width = frac_len + 1);
            let (int_part, frac_part) = padded.split_at(padded.len() - frac_len);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - frac_len);
            write!(f, "{sign}{int_part}.{frac_part}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let d = Decimal::parse("19.99").unwrap();
        assert_eq!(d.to_string(), "19.99");
        let d = Decimal::parse("-3").unwrap();
        assert_eq!(d.to_string(), "-3");
        let d = Decimal::parse("0.001").unwrap();
        assert_eq!(d.to_string(), "0.001");
    }

    #[test]
    fn add_aligns_exponents() {
        let a = Decimal::parse("1.5").unwrap();
        let b = Decimal::parse("2.25").unwrap();
        assert_eq!(a.add(&b).to_string(), "3.75");
    }

    #[test]
    fn div_by_zero_is_none() {
        let a = Decimal::parse("1").unwrap();
        let zero = Decimal::zero();
        assert!(a.div(&zero, 4).is_none());
        assert!(a.floor_div(&zero).is_none());
        assert!(a.rem(&zero).is_none());
    }

    #[test]
    fn ordering_across_exponents() {
        let a = Decimal::parse("1.50").unwrap();
        let b = Decimal::parse("1.5").unwrap();
        assert_eq!(a.cmp_value(&b), Ordering::Equal);
    }
}
