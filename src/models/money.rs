//! Money type for representing currency amounts
//!
//! Amounts are integer minor units (cents). Every ledger computation stays in
//! integer arithmetic; there is no floating-point path anywhere in the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount a single entry may carry ($10 billion). Keeps every
    /// ledger sum far away from `i64` overflow.
    pub const MAX: Money = Money(1_000_000_000_000);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use trip_ledger::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// assert_eq!(amount.to_string(), "$10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    ///
    /// # Examples
    /// ```
    /// use trip_ledger::models::Money;
    /// assert_eq!(Money::from_units(150).cents(), 15_000);
    /// ```
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// The cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Multiply by a whole count (people, days)
    pub const fn times(&self, count: i64) -> Self {
        Self(self.0 * count)
    }

    /// Multiply by a count, `None` on overflow
    pub const fn checked_times(&self, count: i64) -> Option<Self> {
        match self.0.checked_mul(count) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Multiply by a count, clamping at the `i64` bounds
    pub const fn saturating_times(&self, count: i64) -> Self {
        Self(self.0.saturating_mul(count))
    }

    /// Add, `None` on overflow
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Whether the magnitude is beyond `Money::MAX`
    pub const fn exceeds_limit(&self) -> bool {
        self.0.unsigned_abs() > Self::MAX.0 as u64
    }

    /// Floor division by a positive count, returning the quotient and the
    /// leftover cents. `quotient * count + remainder == self` always holds.
    ///
    /// Returns `None` for a non-positive count.
    pub const fn split_floor(&self, count: i64) -> Option<(Self, i64)> {
        if count <= 0 {
            return None;
        }
        let quotient = self.0.div_euclid(count);
        let remainder = self.0.rem_euclid(count);
        Some((Self(quotient), remainder))
    }

    /// Divide by a positive count, rounding half away from zero
    ///
    /// Returns `None` for a non-positive count.
    pub const fn div_round(&self, count: i64) -> Option<Self> {
        if count <= 0 {
            return None;
        }
        let count = count as i128;
        let magnitude = ((self.0 as i128).abs() + count / 2) / count;
        let rounded = if self.0 < 0 { -magnitude } else { magnitude };
        // |rounded| <= |self|, so it always fits back into i64
        Some(Self(rounded as i64))
    }

    /// This amount as basis points (hundredths of a percent) of `whole`
    ///
    /// Returns `None` when `whole` is zero.
    pub fn basis_points_of(&self, whole: Money) -> Option<i64> {
        if whole.is_zero() {
            return None;
        }
        let bp = i128::from(self.0) * 10_000 / i128::from(whole.0);
        Some(bp.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    /// Parse a money amount from a string
    ///
    /// Accepts "10.50", "-10.50", "$10.50", "1,250.00" and "10" (whole units).
    /// Amounts beyond `Money::MAX` are rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s.trim();

        let (negative, rest) = match original.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, original),
        };

        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let cleaned: String = rest.chars().filter(|c| *c != ',').collect();

        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        // Only one leading minus; integer parsing would accept a second sign
        if cleaned.is_empty() || cleaned.contains(['+', '-']) {
            return Err(invalid());
        }

        let cents = match cleaned.split_once('.') {
            Some((whole, fraction)) => {
                if fraction.contains('.') || !fraction.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let whole: i64 = if whole.is_empty() {
                    0
                } else {
                    whole.parse().map_err(|_| invalid())?
                };
                let fraction_cents: i64 = match fraction.len() {
                    0 => 0,
                    1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => fraction.parse().map_err(|_| invalid())?,
                    _ => return Err(MoneyParseError::TooPrecise(original.to_string())),
                };
                whole
                    .checked_mul(100)
                    .and_then(|c| c.checked_add(fraction_cents))
                    .ok_or_else(invalid)?
            }
            None => cleaned
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or_else(invalid)?,
        };

        let amount = Self(if negative { -cents } else { cents });
        if amount.exceeds_limit() {
            return Err(MoneyParseError::TooLarge(original.to_string()));
        }
        Ok(amount)
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }

    /// Plain decimal rendering without a symbol ("-12.05"), used for CSV
    pub fn to_decimal_string(&self) -> String {
        self.format_with_symbol("")
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("Invalid money format: {0}")]
    InvalidFormat(String),
    #[error("Amounts are limited to whole cents: {0}")]
    TooPrecise(String),
    #[error("Amount is larger than {}: {0}", Money::MAX)]
    TooLarge(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "$10.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(-1050)), "-$10.50");
        assert_eq!(format!("{}", Money::from_cents(5)), "$0.05");
        assert_eq!(format!("{:>8}", Money::from_cents(5)), "   $0.05");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(a.times(3).cents(), 3000);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        assert_eq!(a.checked_times(3), Some(Money::from_cents(3000)));
        assert_eq!(a.checked_add(a), Some(Money::from_cents(2000)));
        assert_eq!(Money::MAX.checked_times(i64::MAX), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(a), None);
        assert_eq!(Money::MAX.saturating_times(i64::MAX).cents(), i64::MAX);
    }

    #[test]
    fn test_limit() {
        assert!(!Money::MAX.exceeds_limit());
        assert!(!(-Money::MAX).exceeds_limit());
        assert!((Money::MAX + Money::from_cents(1)).exceeds_limit());
        assert!(Money::from_cents(i64::MIN).exceeds_limit());
    }

    #[test]
    fn test_split_floor_reconciles() {
        let (base, remainder) = Money::from_cents(10_000).split_floor(3).unwrap();
        assert_eq!(base.cents(), 3333);
        assert_eq!(remainder, 1);
        assert_eq!(base.cents() * 3 + remainder, 10_000);
        assert!(Money::from_cents(100).split_floor(0).is_none());
    }

    #[test]
    fn test_div_round_half_up() {
        assert_eq!(Money::from_cents(10).div_round(4).unwrap().cents(), 3); // 2.5 -> 3
        assert_eq!(Money::from_cents(9).div_round(4).unwrap().cents(), 2); // 2.25 -> 2
        assert_eq!(Money::from_cents(-10).div_round(4).unwrap().cents(), -3);
        assert!(Money::from_cents(10).div_round(0).is_none());
        assert_eq!(Money::from_cents(i64::MAX).div_round(1).unwrap().cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MAX).div_round(2).unwrap().cents(), i64::MAX / 2 + 1);
    }

    #[test]
    fn test_basis_points() {
        let spent = Money::from_cents(8_000);
        let budget = Money::from_cents(10_000);
        assert_eq!(spent.basis_points_of(budget), Some(8_000));
        assert_eq!(spent.basis_points_of(Money::zero()), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse("1,250.00").unwrap().cents(), 125_000);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(matches!(
            Money::parse("1.005"),
            Err(MoneyParseError::TooPrecise(_))
        ));
        // A sign is only allowed once, in front
        assert!(Money::parse("--5").is_err());
        assert!(Money::parse("-$-5").is_err());
        assert!(Money::parse("$+5").is_err());
        assert!(Money::parse("+5").is_err());
        assert!(Money::parse("5.-5").is_err());
        assert!(Money::parse("5-").is_err());
    }

    #[test]
    fn test_parse_rejects_amounts_over_limit() {
        assert_eq!(Money::parse("10,000,000,000").unwrap(), Money::MAX);
        assert_eq!(Money::parse("-10000000000.00").unwrap(), -Money::MAX);
        assert!(matches!(
            Money::parse("10000000000.01"),
            Err(MoneyParseError::TooLarge(_))
        ));
        assert!(matches!(
            Money::parse("92233720368547758"),
            Err(MoneyParseError::TooLarge(_))
        ));
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(100),
            Money::from_cents(200),
            Money::from_cents(300),
        ];
        let by_ref: Money = amounts.iter().sum();
        let total: Money = amounts.into_iter().sum();
        assert_eq!(total.cents(), 600);
        assert_eq!(by_ref, total);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
