//! Payment reminder urgency.

use std::fmt;

use chrono::NaiveDate;
use rentbook_domain::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Urgency tier derived from days elapsed since the last payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReminderLevel {
    Pending,
    Warning,
    Critical,
}

impl fmt::Display for ReminderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReminderLevel::Pending => "pending",
            ReminderLevel::Warning => "warning",
            ReminderLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Day counts at which a reminder escalates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderThresholds {
    /// First day count classified as [`ReminderLevel::Warning`].
    pub warning_days: i64,
    /// First day count classified as [`ReminderLevel::Critical`].
    pub critical_days: i64,
}

impl Default for ReminderThresholds {
    fn default() -> Self {
        Self {
            warning_days: 5,
            critical_days: 14,
        }
    }
}

impl ReminderThresholds {
    /// Builds thresholds, keeping `critical_days` at or above `warning_days`.
    pub fn new(warning_days: i64, critical_days: i64) -> Self {
        Self {
            warning_days,
            critical_days: critical_days.max(warning_days),
        }
    }

    pub fn level_for(&self, days_since: i64) -> ReminderLevel {
        if days_since >= self.critical_days {
            ReminderLevel::Critical
        } else if days_since >= self.warning_days {
            ReminderLevel::Warning
        } else {
            ReminderLevel::Pending
        }
    }
}

fn never_paid_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Whole days between `last_payment` and `today`.
///
/// A tenant who never paid is measured from 1970-01-01.
pub fn days_since(last_payment: Option<NaiveDate>, today: NaiveDate) -> i64 {
    let since = last_payment.unwrap_or_else(never_paid_epoch);
    (today - since).num_days()
}

/// Urgency for an outstanding amount, or `None` when nothing is owed.
pub fn classify_reminder(
    remaining: Money,
    last_payment: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<ReminderLevel> {
    classify_reminder_with(&ReminderThresholds::default(), remaining, last_payment, today)
}

pub fn classify_reminder_with(
    thresholds: &ReminderThresholds,
    remaining: Money,
    last_payment: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<ReminderLevel> {
    if !remaining.is_positive() {
        return None;
    }
    Some(thresholds.level_for(days_since(last_payment, today)))
}

/// One entry of the reminder feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderCard {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub room_number: Option<String>,
    pub amount_remaining: Money,
    pub days_since_payment: i64,
    pub level: ReminderLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tiers_switch_at_boundaries() {
        let today = day(2024, 7, 20);
        let owed = Money::from_major(100);
        let level = |days: i64| {
            classify_reminder(owed, Some(today - chrono::Duration::days(days)), today)
        };
        assert_eq!(level(0), Some(ReminderLevel::Pending));
        assert_eq!(level(4), Some(ReminderLevel::Pending));
        assert_eq!(level(5), Some(ReminderLevel::Warning));
        assert_eq!(level(13), Some(ReminderLevel::Warning));
        assert_eq!(level(14), Some(ReminderLevel::Critical));
        assert_eq!(level(90), Some(ReminderLevel::Critical));
    }

    #[test]
    fn nothing_owed_is_excluded() {
        let today = day(2024, 7, 20);
        assert_eq!(classify_reminder(Money::ZERO, None, today), None);
        assert_eq!(
            classify_reminder(Money::from_major(-5), Some(today), today),
            None
        );
    }

    #[test]
    fn never_paid_is_critical() {
        let today = day(2024, 7, 20);
        assert_eq!(
            classify_reminder(Money::from_major(1), None, today),
            Some(ReminderLevel::Critical)
        );
        assert!(days_since(None, today) > 19_000);
    }

    #[test]
    fn custom_thresholds_apply() {
        let thresholds = ReminderThresholds::new(2, 3);
        let today = day(2024, 7, 20);
        let owed = Money::from_major(1);
        assert_eq!(
            classify_reminder_with(&thresholds, owed, Some(day(2024, 7, 18)), today),
            Some(ReminderLevel::Warning)
        );
        assert_eq!(
            classify_reminder_with(&thresholds, owed, Some(day(2024, 7, 17)), today),
            Some(ReminderLevel::Critical)
        );
    }

    #[test]
    fn inverted_thresholds_are_clamped() {
        let thresholds = ReminderThresholds::new(10, 3);
        assert_eq!(thresholds.critical_days, 10);
    }
}
