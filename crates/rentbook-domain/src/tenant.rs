//! Tenants and their rolled-over credit bookkeeping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Money, month::MonthKey};

/// A person renting a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    pub move_in_date: NaiveDate,
    /// Credit rolled forward out of `credit_month`. Never negative.
    #[serde(default)]
    pub credit_balance: Money,
    /// Credit that rolled into `credit_month` before its payments were applied.
    #[serde(default)]
    pub opening_credit: Money,
    /// Month whose payments are already folded into `credit_balance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_month: Option<MonthKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub identity: TenantIdentity,
}

/// Record-keeping metadata. Not used by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TenantIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_id_number: Option<String>,
}

impl Tenant {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        room_id: Option<Uuid>,
        move_in_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: phone.into(),
            room_id,
            move_in_date,
            credit_balance: Money::ZERO,
            opening_credit: Money::ZERO,
            credit_month: None,
            last_payment_date: None,
            identity: TenantIdentity::default(),
        }
    }

    pub fn with_identity(mut self, identity: TenantIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Replaces the credit bookkeeping triple in one step.
    pub fn set_credit(&mut self, opening: Money, closing: Money, month: Option<MonthKey>) {
        self.opening_credit = opening.non_negative();
        self.credit_balance = closing.non_negative();
        self.credit_month = month;
    }
}

impl Displayable for Tenant {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.phone)
    }
}
