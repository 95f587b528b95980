use crate::{parse_decimal, DecimalError, ROUNDING};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// A quantity, unit cost, or rate held at up to 6 fractional digits —
/// used for stock quantities, weighted-average cost, tax/FX rates, and any
/// other value that needs more precision than money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    pub fn from_decimal(value: Decimal) -> Self {
        Rate(value.round_dp_with_strategy(6, ROUNDING))
    }

    pub fn parse(raw: &str) -> Result<Self, DecimalError> {
        Ok(Self::from_decimal(parse_decimal(raw)?))
    }

    pub fn from_i64(value: i64) -> Self {
        Rate(Decimal::from(value))
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
        self.0.is_sign_negative()
    }

    pub fn round2(self) -> crate::Money {
        crate::Money::from_decimal(self.0)
    }

    pub fn round6(self) -> Self {
        Rate::from_decimal(self.0)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::ZERO
    }
}

impl FromStr for Rate {
    type Err = DecimalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rate::parse(s)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.round_dp_with_strategy(6, ROUNDING))
    }
}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Rate {
    type Output = Rate;
    fn add(self, rhs: Self) -> Self::Output {
        Rate::from_decimal(self.0 + rhs.0)
    }
}

impl Sub for Rate {
    type Output = Rate;
    fn sub(self, rhs: Self) -> Self::Output {
        Rate::from_decimal(self.0 - rhs.0)
    }
}

impl Mul for Rate {
    type Output = Rate;
    fn mul(self, rhs: Self) -> Self::Output {
        Rate::from_decimal(self.0 * rhs.0)
    }
}

impl Div for Rate {
    type Output = Rate;
    fn div(self, rhs: Self) -> Self::Output {
        Rate::from_decimal(self.0 / rhs.0)
    }
}

impl Neg for Rate {
    type Output = Rate;
    fn neg(self) -> Self::Output {
        Rate::from_decimal(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_six_fractional_digits() {
        let r = Rate::parse("1.1234567").unwrap();
        assert_eq!(r.to_string(), "1.123457");
    }

    #[test]
    fn division_is_followed_by_explicit_rounding() {
        // 50 / 20 = 2.5 exactly, no rounding artifacts
        let value = Rate::from_i64(50);
        let qty = Rate::from_i64(20);
        assert_eq!((value / qty).to_string(), "2.5");
    }

    #[test]
    fn round2_converts_to_money() {
        let rate = Rate::parse("6.0").unwrap();
        let money = rate.round2();
        assert_eq!(money.to_string(), "6.00");
    }
}
