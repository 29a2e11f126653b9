//! Exact money representation using decimal arithmetic.
//!
//! The stall prices everything in Indian rupees. Amounts travel over the
//! wire as plain JSON numbers but are held as [`Decimal`] so that sums and
//! the 5% GST never pick up binary floating point error.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn rupees(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether this amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_json_numbers() {
        let whole: Price = serde_json::from_str("200").unwrap();
        assert_eq!(whole, Price::rupees(200));

        let fractional: Price = serde_json::from_str("27.5").unwrap();
        assert_eq!(fractional, Price::new(Decimal::new(275, 1)));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::new(Decimal::new(5775, 1));
        assert_eq!(serde_json::to_string(&price).unwrap(), "577.5");
    }

    #[test]
    fn test_display_uses_rupee_symbol() {
        assert_eq!(Price::rupees(40).to_string(), "₹40");
        assert_eq!(Price::new(Decimal::new(27_50, 2)).to_string(), "₹27.5");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::rupees(200).times(2), Price::rupees(150).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::rupees(550));
    }
}
