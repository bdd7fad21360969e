//! Rent ledger calculator.
//!
//! Every balance figure shown anywhere (dashboard arrears, tenant list net
//! balance, analytics credit totals, reminder remaining amounts) is a
//! projection of one [`compute_balance`] result.

use std::{collections::BTreeMap, fmt};

use rentbook_domain::{Money, MonthKey, Payment, Tenant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monthly position of a tenant relative to the rent obligation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BalanceClass {
    Credit,
    Paid,
    Arrears,
}

impl fmt::Display for BalanceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BalanceClass::Credit => "credit",
            BalanceClass::Paid => "paid",
            BalanceClass::Arrears => "arrears",
        };
        f.write_str(label)
    }
}

/// Figures derived from rent, prior credit and the month's payments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub monthly_rent: Money,
    pub paid_this_month: Money,
    pub prior_credit: Money,
    /// `paid_this_month + prior_credit`.
    pub coverage: Money,
    /// `max(0, rent - coverage)`.
    pub remaining: Money,
    /// `max(0, coverage - rent)`, rolled into the next month.
    pub new_credit: Money,
    /// Signed `coverage - rent`.
    pub net: Money,
    pub classification: BalanceClass,
}

/// Derives a tenant's position for one month.
///
/// Absent prior credit counts as zero. At most one of `remaining` and
/// `new_credit` is nonzero.
pub fn compute_balance(
    monthly_rent: Money,
    prior_credit: Option<Money>,
    paid_this_month: Money,
) -> Balance {
    let prior_credit = prior_credit.unwrap_or(Money::ZERO).non_negative();
    let coverage = paid_this_month + prior_credit;
    let net = coverage - monthly_rent;
    let classification = if coverage > monthly_rent {
        BalanceClass::Credit
    } else if coverage == monthly_rent {
        BalanceClass::Paid
    } else {
        BalanceClass::Arrears
    };
    Balance {
        monthly_rent,
        paid_this_month,
        prior_credit,
        coverage,
        remaining: (-net).non_negative(),
        new_credit: net.non_negative(),
        net,
        classification,
    }
}

/// A tenant's balance for a specific month. Computed on demand, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub tenant_id: Uuid,
    pub month: MonthKey,
    #[serde(flatten)]
    pub balance: Balance,
}

impl BalanceSnapshot {
    pub fn new(tenant_id: Uuid, month: MonthKey, balance: Balance) -> Self {
        Self {
            tenant_id,
            month,
            balance,
        }
    }

    pub fn remaining(&self) -> Money {
        self.balance.remaining
    }

    pub fn new_credit(&self) -> Money {
        self.balance.new_credit
    }

    pub fn net(&self) -> Money {
        self.balance.net
    }

    pub fn classification(&self) -> BalanceClass {
        self.balance.classification
    }
}

/// Credit bookkeeping persisted on a tenant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreditState {
    /// Credit rolled into `month`.
    pub opening: Money,
    /// Credit rolled out of `month`.
    pub closing: Money,
    /// Latest month with payments folded in.
    pub month: Option<MonthKey>,
}

impl CreditState {
    pub fn of(tenant: &Tenant) -> Self {
        Self {
            opening: tenant.opening_credit,
            closing: tenant.credit_balance,
            month: tenant.credit_month,
        }
    }

    pub fn apply_to(&self, tenant: &mut Tenant) {
        tenant.set_credit(self.opening, self.closing, self.month);
    }
}

/// Sums payment amounts dated within the calendar `month`.
pub fn sum_payments_in_month<'a>(
    payments: impl IntoIterator<Item = &'a Payment>,
    month: MonthKey,
) -> Money {
    payments
        .into_iter()
        .filter(|payment| month.contains(payment.date))
        .map(|payment| payment.amount)
        .sum()
}

/// Rebuilds credit bookkeeping from a payment history.
///
/// Payment months are walked in ascending order; each month's new credit is
/// the next payment month's prior credit. Months without payments neither
/// consume nor add credit.
///
/// Every month is priced at `monthly_rent`. Replaying after a rent change
/// re-prices past months and can disagree with the credit built up by
/// incremental payments.
pub fn replay_credit<'a>(
    monthly_rent: Money,
    payments: impl IntoIterator<Item = &'a Payment>,
) -> CreditState {
    let mut by_month: BTreeMap<MonthKey, Money> = BTreeMap::new();
    for payment in payments {
        *by_month.entry(payment.month()).or_default() += payment.amount;
    }

    let mut state = CreditState::default();
    for (month, paid) in by_month {
        let opening = state.closing;
        let balance = compute_balance(monthly_rent, Some(opening), paid);
        state = CreditState {
            opening,
            closing: balance.new_credit,
            month: Some(month),
        };
    }
    state
}

/// Credit that rolled into `month` for `tenant`.
///
/// Uses the stored bookkeeping when it covers `month` and falls back to a
/// replay of `history` when the stored credit already includes later months.
pub fn prior_credit_for(
    tenant: &Tenant,
    month: MonthKey,
    monthly_rent: Money,
    history: &[Payment],
) -> Money {
    match tenant.credit_month {
        None => tenant.credit_balance,
        Some(credit_month) if credit_month == month => tenant.opening_credit,
        Some(credit_month) if credit_month < month => tenant.credit_balance,
        Some(_) => {
            let earlier = history
                .iter()
                .filter(|payment| payment.tenant_id == tenant.id && payment.month() < month);
            replay_credit(monthly_rent, earlier).closing
        }
    }
}
