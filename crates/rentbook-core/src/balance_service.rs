use rentbook_domain::{Money, MonthKey, Tenant};

use crate::{
    ledger::{compute_balance, prior_credit_for, sum_payments_in_month, BalanceSnapshot},
    store::RecordStore,
};

/// Read-only balance projections for tenants.
pub struct BalanceService;

impl BalanceService {
    /// Monthly rent owed by `tenant`. A tenant without a room owes nothing.
    pub fn rent_for<S: RecordStore>(store: &S, tenant: &Tenant) -> Money {
        tenant
            .room_id
            .and_then(|id| store.get_room(id).ok())
            .map(|room| room.monthly_rent)
            .unwrap_or(Money::ZERO)
    }

    /// Balance of `tenant` for `month`, computed from the stored history.
    pub fn snapshot_for<S: RecordStore>(store: &S, tenant: &Tenant, month: MonthKey) -> BalanceSnapshot {
        let rent = Self::rent_for(store, tenant);
        let history = store.list_payments(tenant.id);
        let prior = prior_credit_for(tenant, month, rent, &history);
        let paid = sum_payments_in_month(&history, month);
        BalanceSnapshot::new(tenant.id, month, compute_balance(rent, Some(prior), paid))
    }

    /// Snapshots for every tenant, in store order.
    pub fn snapshots<S: RecordStore>(store: &S, month: MonthKey) -> Vec<BalanceSnapshot> {
        store
            .tenants()
            .iter()
            .map(|tenant| Self::snapshot_for(store, tenant, month))
            .collect()
    }
}
