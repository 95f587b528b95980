use crate::{parse_decimal, DecimalError, ROUNDING};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A monetary amount, always held at 2 fractional digits.
///
/// Construction rounds half-away-from-zero to 2 digits, so a `Money` value
/// is never seen in a "not yet rounded" intermediate state once it leaves a
/// constructor — multiplication/division that would widen the scale must go
/// through [`Money::round2`] explicitly (see `mul_rate`), matching the
/// spec's "values used in posting are always rounded to 2 digits before
/// write" invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Construct from an already-scaled `Decimal`, rounding to 2 digits.
    pub fn from_decimal(value: Decimal) -> Self {
        Money(value.round_dp_with_strategy(2, ROUNDING))
    }

    /// Parse a decimal string, e.g. "220.00" or "-5.5".
    pub fn parse(raw: &str) -> Result<Self, DecimalError> {
        Ok(Self::from_decimal(parse_decimal(raw)?))
    }

    /// Construct from integer minor units (cents).
    pub fn from_minor_units(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn to_minor_units(self) -> i64 {
        let scaled = (self.0 * Decimal::new(100, 0)).round_dp_with_strategy(0, ROUNDING);
        scaled.to_string().parse::<i64>().unwrap_or(0)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Multiply by a rate (e.g. tax rate, exchange rate) and round the
    /// result to 2 digits. This is the only place scale-widening
    /// multiplication is allowed to happen on `Money`.
    pub fn mul_rate(self, rate: crate::Rate) -> Self {
        Money::from_decimal(self.0 * rate.as_decimal())
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl FromStr for Money {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.round_dp_with_strategy(2, ROUNDING))
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Self) -> Self::Output {
        Money::from_decimal(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Self) -> Self::Output {
        Money::from_decimal(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Self::Output {
        Money::from_decimal(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rate;

    #[test]
    fn parse_rounds_half_away_from_zero() {
        assert_eq!(Money::parse("1.005").unwrap().to_string(), "1.01");
        assert_eq!(Money::parse("-1.005").unwrap().to_string(), "-1.01");
        assert_eq!(Money::parse("1.004").unwrap().to_string(), "1.00");
    }

    #[test]
    fn addition_and_subtraction_stay_balanced() {
        let a = Money::parse("100.00").unwrap();
        let b = Money::parse("120.00").unwrap();
        assert_eq!((a + b).to_string(), "220.00");
        assert_eq!((b - a).to_string(), "20.00");
    }

    #[test]
    fn mul_rate_rounds_result_to_cents() {
        let line = Money::parse("200.00").unwrap();
        let tax = Rate::parse("0.10").unwrap();
        assert_eq!(line.mul_rate(tax).to_string(), "20.00");
    }

    #[test]
    fn minor_units_round_trip() {
        let m = Money::from_minor_units(22000);
        assert_eq!(m.to_string(), "220.00");
        assert_eq!(m.to_minor_units(), 22000);
    }

    #[test]
    fn sum_over_iterator_accumulates() {
        let lines = vec![
            Money::parse("10.00").unwrap(),
            Money::parse("5.50").unwrap(),
            Money::parse("0.25").unwrap(),
        ];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.to_string(), "15.75");
    }

    #[test]
    fn invalid_input_is_rejected_without_panicking() {
        assert!(Money::parse("not-a-number").is_err());
    }
}
