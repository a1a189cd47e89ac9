//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input string is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative price amount.
///
/// Stored documents carry prices as decimal strings, so `Price` serializes
/// through `rust_decimal`'s string representation rather than a float.
/// There is a single implicit currency; no currency code is carried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply this price by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        self.times(quantity)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_parse_from_document_string() {
        let price: Price = "10.50".parse().unwrap();
        assert_eq!(price.amount(), Decimal::new(1050, 2));
        assert!("ten dollars".parse::<Price>().is_err());
        assert_eq!("-3".parse::<Price>(), Err(PriceError::Negative));
    }

    #[test]
    fn test_line_total_and_sum() {
        let a: Price = "10".parse().unwrap();
        let b: Price = "2.25".parse().unwrap();
        assert_eq!(a.times(2), "20".parse().unwrap());
        let total: Price = [a.times(2), b].into_iter().sum();
        assert_eq!(total, "22.25".parse().unwrap());
    }

    #[test]
    fn test_serde_as_string() {
        let price: Price = "19.99".parse().unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"19.99\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_display_two_decimals() {
        let price: Price = "7.5".parse().unwrap();
        assert_eq!(price.to_string(), "7.50");
    }
}
