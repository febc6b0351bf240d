//! Monetary amounts using decimal arithmetic.
//!
//! The API reports prices, subtotals and order totals as JSON numbers in a
//! single currency (USD). `Money` keeps them as [`Decimal`] so sums and
//! formatting never pick up binary floating point noise.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount of money in dollars.
///
/// Serialized as a plain JSON number (`19.99`), matching the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal number of dollars.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded half-up to whole cents.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Renders `$12.50`: a dollar sign and exactly two decimals.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded.abs())
        }
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_decimals() {
        assert_eq!(Money::from_cents(1250).to_string(), "$12.50");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_display_rounds_half_up() {
        let amount = Money::new(Decimal::new(10_005, 3));
        assert_eq!(amount.to_string(), "$10.01");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::from_cents(-399).to_string(), "-$3.99");
    }

    #[test]
    fn test_deserializes_from_json_numbers() {
        let price: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(price.to_string(), "$19.99");

        let zero: Money = serde_json::from_str("0").unwrap();
        assert_eq!(zero, Money::ZERO);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(Money::from_cents(2500)).unwrap();
        assert!(json.is_number());
        assert!((json.as_f64().unwrap() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_totals() {
        let price = Money::from_cents(1999);
        let total: Money = [price * 2, Money::from_cents(2)].into_iter().sum();
        assert_eq!(total, Money::from_cents(4000));
    }
}
