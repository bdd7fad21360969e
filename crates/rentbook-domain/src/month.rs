//! Calendar year-month keys used to bucket payments.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar month such as `2024-07`.
///
/// Ordering is chronological. Serialized as the `YYYY-MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid YYYY-MM month")]
pub struct MonthKeyError(pub String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(MonthKeyError(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthKeyError(trimmed.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| MonthKeyError(trimmed.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthKeyError(trimmed.to_string()))?;
        Self::new(year, month).map_err(|_| MonthKeyError(trimmed.to_string()))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn buckets_by_calendar_month() {
        let july = MonthKey::from_date(date(2024, 7, 15));
        assert_eq!(july.to_string(), "2024-07");
        assert!(july.contains(date(2024, 7, 1)));
        assert!(july.contains(date(2024, 7, 31)));
        assert!(!july.contains(date(2024, 8, 1)));
        assert!(!july.contains(date(2023, 7, 15)));
    }

    #[test]
    fn steps_across_year_boundaries() {
        let december: MonthKey = "2023-12".parse().unwrap();
        assert_eq!(december.next().to_string(), "2024-01");
        assert_eq!(december.next().previous(), december);
        assert!(december < december.next());
    }

    #[test]
    fn rejects_invalid_months() {
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024".parse::<MonthKey>().is_err());
        assert!("July".parse::<MonthKey>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let key = MonthKey::new(2024, 7).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-07\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
