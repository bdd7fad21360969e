//! Fixed-point currency amounts.
//!
//! Rent arithmetic compares coverage against rent for exact equality, so
//! amounts are kept as integer minor units (cents) rather than floats.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINOR_PER_MAJOR: i64 = 100;
const GROUPING_SEPARATOR: char = ',';
/// Largest magnitude accepted from text, in major units.
pub const MAX_PARSED_MAJOR: i64 = 1_000_000_000_000;

/// A signed currency amount stored as minor units.
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("`{0}` is not a valid amount")]
    Malformed(String),
    #[error("`{0}` has more than two decimal places")]
    TooPrecise(String),
    #[error("`{0}` is out of range")]
    Overflow(String),
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(MINOR_PER_MAJOR))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Clamps negative amounts to zero.
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }

    /// Formats the amount with thousands grouping and two decimals, e.g. `-15,000.50`.
    pub fn format_plain(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / MINOR_PER_MAJOR as u64;
        let minor = abs % MINOR_PER_MAJOR as u64;
        format!(
            "{sign}{}.{minor:02}",
            group_digits(&major.to_string(), GROUPING_SEPARATOR)
        )
    }

    /// Formats the amount prefixed by a currency code, e.g. `KES 15,000.00`.
    pub fn format_with(self, currency: &str) -> String {
        if currency.is_empty() {
            self.format_plain()
        } else {
            format!("{} {}", currency, self.format_plain())
        }
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_plain())
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let cleaned: String = body.chars().filter(|c| *c != GROUPING_SEPARATOR).collect();
        let (int_part, frac_part) = match cleaned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (cleaned.as_str(), ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(MoneyParseError::Malformed(raw.to_string()));
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(MoneyParseError::Malformed(raw.to_string()));
        }
        if frac_part.len() > 2 {
            return Err(MoneyParseError::TooPrecise(raw.to_string()));
        }

        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| MoneyParseError::Overflow(raw.to_string()))?
        };
        if major > MAX_PARSED_MAJOR {
            return Err(MoneyParseError::Overflow(raw.to_string()));
        }
        let minor: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().unwrap_or(0) * 10,
            _ => frac_part.parse::<i64>().unwrap_or(0),
        };
        let total = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(minor))
            .ok_or_else(|| MoneyParseError::Overflow(raw.to_string()))?;
        Ok(Money(if negative { -total } else { total }))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("15000".parse::<Money>().unwrap(), Money::from_major(15_000));
        assert_eq!("15,000.50".parse::<Money>().unwrap(), Money::from_minor(1_500_050));
        assert_eq!("0.5".parse::<Money>().unwrap(), Money::from_minor(50));
        assert_eq!("-200".parse::<Money>().unwrap(), Money::from_major(-200));
        assert_eq!(".75".parse::<Money>().unwrap(), Money::from_minor(75));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert!(matches!(
            "12a".parse::<Money>(),
            Err(MoneyParseError::Malformed(_))
        ));
        assert!(matches!(
            "1.005".parse::<Money>(),
            Err(MoneyParseError::TooPrecise(_))
        ));
        assert!(matches!(".".parse::<Money>(), Err(MoneyParseError::Malformed(_))));
    }

    #[test]
    fn rejects_amounts_above_the_parse_limit() {
        assert_eq!(
            "1,000,000,000,000".parse::<Money>().unwrap(),
            Money::from_major(MAX_PARSED_MAJOR)
        );
        assert!(matches!(
            "90,000,000,000,000,000".parse::<Money>(),
            Err(MoneyParseError::Overflow(_))
        ));
        assert!(matches!(
            "-1,000,000,000,001".parse::<Money>(),
            Err(MoneyParseError::Overflow(_))
        ));
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_minor(i64::MAX - 1);
        assert_eq!(huge + huge, Money::from_minor(i64::MAX));
        assert_eq!(-huge - huge, Money::from_minor(i64::MIN));
        assert_eq!(-Money::from_minor(i64::MIN), Money::from_minor(i64::MAX));
        assert_eq!([huge, huge, -huge].iter().sum::<Money>(), Money::from_minor(1));

        let mut total = huge;
        total += huge;
        assert_eq!(total, Money::from_minor(i64::MAX));
    }

    #[test]
    fn formats_with_grouping_and_currency() {
        assert_eq!(Money::from_major(15_000).format_with("KES"), "KES 15,000.00");
        assert_eq!(Money::from_minor(-123_456_78).to_string(), "-123,456.78");
        assert_eq!(Money::ZERO.format_with(""), "0.00");
    }

    #[test]
    fn serializes_as_minor_units() {
        let json = serde_json::to_string(&Money::from_major(12)).unwrap();
        assert_eq!(json, "1200");
    }
}
