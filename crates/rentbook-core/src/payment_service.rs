//! Recording and removing payments, keeping tenant credit in step.

use chrono::NaiveDate;
use rentbook_domain::{Displayable, Money, MonthKey, Payment};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    balance_service::BalanceService,
    ledger::{compute_balance, prior_credit_for, replay_credit, BalanceSnapshot, CreditState},
    store::RecordStore,
    CoreError,
};

/// Rules for which payment amounts are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentPolicy {
    /// Accept zero and negative amounts as manual adjustments.
    pub allow_adjustments: bool,
}

impl PaymentPolicy {
    pub fn check(&self, amount: Money) -> Result<(), CoreError> {
        if amount.is_positive() || self.allow_adjustments {
            Ok(())
        } else {
            Err(CoreError::InvalidInput(format!(
                "payment amount must be positive, got {amount}"
            )))
        }
    }
}

/// Payment joined with the tenant and room it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment: Payment,
    pub tenant_name: String,
    pub room_number: Option<String>,
}

pub struct PaymentService;

impl PaymentService {
    /// Records a payment under the default policy.
    pub fn apply_payment<S: RecordStore>(
        store: &mut S,
        tenant_id: Uuid,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<BalanceSnapshot, CoreError> {
        Self::apply_payment_with(store, &PaymentPolicy::default(), tenant_id, amount, date, note)
    }

    /// Records a payment and rolls the tenant's credit forward.
    ///
    /// The balance is computed for the month of `date`. A payment dated
    /// before the tenant's credit month rebuilds the credit from history.
    pub fn apply_payment_with<S: RecordStore>(
        store: &mut S,
        policy: &PaymentPolicy,
        tenant_id: Uuid,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<BalanceSnapshot, CoreError> {
        policy.check(amount)?;
        let month = MonthKey::from_date(date);
        let snapshot = store.transaction(|store| {
            let tenant = store.get_tenant(tenant_id)?.clone();
            let rent = BalanceService::rent_for(store, &tenant);
            let history = store.list_payments(tenant_id);
            let prior = prior_credit_for(&tenant, month, rent, &history);

            store.insert_payment(Payment::new(tenant_id, amount, date, note))?;
            store.update_tenant_last_payment(tenant_id, tenant.last_payment_date.max(Some(date)))?;

            let paid = store.sum_payments(tenant_id, month);
            let balance = compute_balance(rent, Some(prior), paid);
            let credit = match tenant.credit_month {
                Some(credit_month) if credit_month > month => {
                    debug!(tenant = %tenant_id, %month, %credit_month, "back-dated payment, replaying credit");
                    replay_credit(rent, &store.list_payments(tenant_id))
                }
                _ => CreditState {
                    opening: prior,
                    closing: balance.new_credit,
                    month: Some(month),
                },
            };
            store.update_tenant_credit(tenant_id, credit)?;
            Ok(BalanceSnapshot::new(tenant_id, month, balance))
        })?;
        info!(
            tenant = %tenant_id,
            %month,
            amount = %amount,
            class = %snapshot.classification(),
            "payment recorded"
        );
        Ok(snapshot)
    }

    /// Deletes a payment and rebuilds the tenant's credit and last payment date
    /// from the remaining history.
    pub fn delete_payment<S: RecordStore>(store: &mut S, payment_id: Uuid) -> Result<Payment, CoreError> {
        let payment = store.transaction(|store| {
            let payment = store.remove_payment(payment_id)?;
            let tenant = store.get_tenant(payment.tenant_id)?.clone();
            let rent = BalanceService::rent_for(store, &tenant);
            let history = store.list_payments(tenant.id);
            store.update_tenant_credit(tenant.id, replay_credit(rent, &history))?;
            let latest = history.iter().map(|payment| payment.date).max();
            store.update_tenant_last_payment(tenant.id, latest)?;
            Ok(payment)
        })?;
        info!(payment = %payment.display_label(), tenant = %payment.tenant_id, "payment deleted");
        Ok(payment)
    }

    /// Every payment, most recent first.
    pub fn list<S: RecordStore>(store: &S) -> Vec<PaymentRow> {
        let mut rows: Vec<PaymentRow> = store
            .payments()
            .iter()
            .map(|payment| {
                let tenant = store.get_tenant(payment.tenant_id).ok();
                PaymentRow {
                    payment: payment.clone(),
                    tenant_name: tenant.map(|t| t.name.clone()).unwrap_or_default(),
                    room_number: tenant
                        .and_then(|t| t.room_id)
                        .and_then(|id| store.get_room(id).ok())
                        .map(|room| room.number.clone()),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.payment.date.cmp(&a.payment.date));
        rows
    }

    /// Payments of one tenant, most recent first.
    pub fn history<S: RecordStore>(store: &S, tenant_id: Uuid) -> Result<Vec<Payment>, CoreError> {
        store.get_tenant(tenant_id)?;
        Ok(store.list_payments(tenant_id))
    }

    /// Resolves a payment by id prefix.
    pub fn find<'a, S: RecordStore>(store: &'a S, prefix: &str) -> Result<&'a Payment, CoreError> {
        let prefix = prefix.trim().to_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Err(CoreError::InvalidInput("payment id is required".into()));
        }
        let matches: Vec<&Payment> = store
            .payments()
            .iter()
            .filter(|payment| payment.id.simple().to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [payment] => Ok(*payment),
            [] => Err(CoreError::InvalidInput(format!("no payment matches `{prefix}`"))),
            _ => Err(CoreError::InvalidInput(format!(
                "`{prefix}` matches {} payments",
                matches.len()
            ))),
        }
    }
}
