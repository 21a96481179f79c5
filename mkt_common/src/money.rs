use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "USD";
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------       Money       -----------------------------------------------------------
/// A monetary amount in minor units (cents). All arithmetic is integer arithmetic; amounts are
/// parsed from decimal strings and never pass through a float.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(pub String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl Money {
    /// The amount in minor units.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub const fn from_minor(value: i64) -> Self {
        Self(value)
    }

    pub fn from_major(value: i64) -> Self {
        Self(value * MINOR_UNITS_PER_MAJOR)
    }

    /// Multiplies a unit price by an order quantity. `None` on overflow rather than wrapping,
    /// since order totals are persisted verbatim.
    pub fn checked_mul(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Self)
    }

    /// Divides the amount by `divisor`, rounding half-up at minor-unit precision.
    /// This is the per-unit price calculation: `total / quantity`.
    pub fn div_round_half_up(self, divisor: i64) -> Result<Self, MoneyConversionError> {
        if divisor <= 0 {
            return Err(MoneyConversionError(format!("cannot divide an amount by {divisor}")));
        }
        // floor((2n + d) / 2d) rounds n/d half-up for non-negative n
        if self.0 < 0 {
            return Err(MoneyConversionError("cannot split a negative amount".to_string()));
        }
        let n = self.0 as i128;
        let d = divisor as i128;
        let q = (2 * n + d) / (2 * d);
        Ok(Self(q as i64))
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a decimal amount such as `"19.99"`, `"7"` or `"-0.50"` into minor units.
    /// At most two fractional digits are accepted; the catalog and provider contracts both
    /// quote prices at currency precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(MoneyConversionError(format!("'{s}' is not a decimal amount")));
        }
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!(
                "'{s}' has more than 2 decimal places and cannot be represented in minor units"
            )));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyConversionError(format!("'{s}' is not a decimal amount")));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|e| MoneyConversionError(format!("'{s}': {e}")))?
        };
        let mut minor: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|e| MoneyConversionError(format!("'{s}': {e}")))?
        };
        if frac.len() == 1 {
            minor *= 10;
        }
        let value = whole
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(|| MoneyConversionError(format!("'{s}' is too large")))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / MINOR_UNITS_PER_MAJOR as u64, abs % MINOR_UNITS_PER_MAJOR as u64)
    }
}

// On the wire, amounts are decimal strings ("39.98"), matching the catalog and order API
// contracts. The minor-unit representation is an internal detail.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        assert_eq!("19.99".parse::<Money>().unwrap(), Money::from_minor(1999));
        assert_eq!("0.5".parse::<Money>().unwrap(), Money::from_minor(50));
        assert_eq!("7".parse::<Money>().unwrap(), Money::from_minor(700));
        assert_eq!("-1.25".parse::<Money>().unwrap(), Money::from_minor(-125));
        assert_eq!(".99".parse::<Money>().unwrap(), Money::from_minor(99));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!("1.999".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("12,50".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
    }

    #[test]
    fn total_is_exact_under_multiplication() {
        let price = "19.99".parse::<Money>().unwrap();
        assert_eq!(price.checked_mul(2), Some(Money::from_minor(3998)));
        assert_eq!(Money::from_minor(i64::MAX).checked_mul(2), None);
    }

    #[test]
    fn unit_price_rounds_half_up() {
        assert_eq!(Money::from_minor(3998).div_round_half_up(2).unwrap(), Money::from_minor(1999));
        // 1001 / 2 = 500.5 -> 501
        assert_eq!(Money::from_minor(1001).div_round_half_up(2).unwrap(), Money::from_minor(501));
        // 100 / 3 = 33.33.. -> 33
        assert_eq!(Money::from_minor(100).div_round_half_up(3).unwrap(), Money::from_minor(33));
        assert!(Money::from_minor(100).div_round_half_up(0).is_err());
    }

    #[test]
    fn displays_as_decimal() {
        assert_eq!(Money::from_minor(3998).to_string(), "39.98");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-125).to_string(), "-1.25");
    }
}
