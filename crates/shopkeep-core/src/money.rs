//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale's profit is Σ (salePrice − costPrice) × quantity. Summed over  │
//! │  a month of sales, float drift shows up in the report totals.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                     │
//! │    Every price, cost, total and profit is an i64 of the smallest       │
//! │    currency unit. Sums are exact.                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopkeep_core::money::Money;
//!
//! let sale_price = Money::from_minor(50_000);
//! let cost_price = Money::from_minor(35_000);
//!
//! let line_total = sale_price.checked_multiply_quantity(3).unwrap();
//! let line_profit = (sale_price - cost_price).checked_multiply_quantity(3).unwrap();
//!
//! assert_eq!(line_total.minor(), 150_000);
//! assert_eq!(line_profit.minor(), 45_000);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative when an item sells below cost
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: appears as a bare JSON number on the wire
/// - **Whole units only**: `49.0` is accepted, `49.5` is rejected with a
///   message saying so
///
/// ## Where Money Flows
/// ```text
/// Product.costPrice ──┐
///                     ├──► SaleTotals ──► Sale.totalAmount / Sale.profit
/// SaleLine.salePrice ─┘                          │
///                                                ▼
///                                   MonthlySummary.totalSales / totalProfit
/// ```
///
/// ## TypeScript
/// Fields of this type carry `#[ts(type = "number")]` so the web client sees
/// a plain number rather than ts-rs's default `bigint` for `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// let price = Money::from_minor(35_000);
    /// assert_eq!(price.minor(), 35_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(50_000);
    /// assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_minor(150_000)));
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders with thousands separators (`150,000`, `-2,500`).
///
/// ## Note
/// This is for logs and error messages. The client formats currency itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{}", grouped)
        } else {
            write!(f, "{}", grouped)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a whole number of currency units")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map(Money)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(Money(v as i64))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_minor(0).to_string(), "0");
        assert_eq!(Money::from_minor(999).to_string(), "999");
        assert_eq!(Money::from_minor(1_000).to_string(), "1,000");
        assert_eq!(Money::from_minor(150_000).to_string(), "150,000");
        assert_eq!(Money::from_minor(1_234_567).to_string(), "1,234,567");
        assert_eq!(Money::from_minor(-2_500).to_string(), "-2,500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        assert_eq!((b - a).minor(), -500);
    }

    #[test]
    fn test_sum() {
        let values = [Money::from_minor(100), Money::from_minor(250), Money::from_minor(-50)];
        let total: Money = values.iter().sum();
        assert_eq!(total.minor(), 300);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_checked_overflow() {
        assert!(Money::from_minor(i64::MAX).checked_multiply_quantity(2).is_none());
        assert!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)).is_none());
        assert_eq!(
            Money::from_minor(7).checked_multiply_quantity(6),
            Some(Money::from_minor(42))
        );
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::from_minor(50_000)).unwrap();
        assert_eq!(json, "50000");

        let back: Money = serde_json::from_str("35000").unwrap();
        assert_eq!(back, Money::from_minor(35_000));
    }

    #[test]
    fn test_deserialize_accepts_whole_floats_only() {
        let whole: Money = serde_json::from_str("49.0").unwrap();
        assert_eq!(whole, Money::from_minor(49));

        let err = serde_json::from_str::<Money>("49.5").unwrap_err();
        assert!(err.to_string().contains("expected a whole number of currency units"));

        assert!(serde_json::from_str::<Money>("\"49\"").is_err());
        assert!(serde_json::from_str::<Money>("1e30").is_err());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
        assert!(!Money::from_minor(-1).is_positive());
    }
}
