//! Recorded rent payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Money, month::MonthKey};

/// A dated payment made by a tenant. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Payment {
    pub fn new(tenant_id: Uuid, amount: Money, date: NaiveDate, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            amount,
            date,
            note: note.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

impl Displayable for Payment {
    fn display_label(&self) -> String {
        format!("payment:{} {} on {}", short_id(self.id), self.amount, self.date)
    }
}
