//! Typed reports for the dashboard, tenant list, analytics and reminders.

use chrono::NaiveDate;
use rentbook_domain::{Money, MonthKey, Tenant};
use serde::Serialize;

use crate::{
    balance_service::BalanceService,
    ledger::{BalanceClass, BalanceSnapshot},
    reminder::{classify_reminder_with, days_since, ReminderCard, ReminderThresholds},
    store::RecordStore,
};

/// Room counts by status.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct OccupancyStats {
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    pub vacant_rooms: usize,
    pub total_tenants: usize,
}

/// One row of the tenant balance list.
#[derive(Debug, Clone, Serialize)]
pub struct TenantBalanceRow {
    pub tenant_id: uuid::Uuid,
    pub name: String,
    pub phone: String,
    pub room_number: Option<String>,
    pub move_in_date: NaiveDate,
    pub last_payment_date: Option<NaiveDate>,
    pub days_since_payment: Option<i64>,
    pub snapshot: BalanceSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub month: MonthKey,
    pub stats: OccupancyStats,
    pub total_arrears: Money,
    /// Most recent move-ins first.
    pub recent_tenants: Vec<TenantBalanceRow>,
    pub reminders: Vec<ReminderCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub month: MonthKey,
    pub arrears_tenants: Vec<TenantBalanceRow>,
    pub credit_tenants: Vec<TenantBalanceRow>,
    pub total_arrears: Money,
    pub total_credit: Money,
    pub total_expected: Money,
    pub collected_this_month: Money,
    pub stats: OccupancyStats,
}

/// Knobs shared by the reports.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub thresholds: ReminderThresholds,
    pub recent_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            thresholds: ReminderThresholds::default(),
            recent_limit: 5,
        }
    }
}

pub struct ReportService;

impl ReportService {
    pub fn occupancy<S: RecordStore>(store: &S) -> OccupancyStats {
        let total_rooms = store.rooms().len();
        let occupied_rooms = store.rooms().iter().filter(|room| !room.is_vacant()).count();
        OccupancyStats {
            total_rooms,
            occupied_rooms,
            vacant_rooms: total_rooms - occupied_rooms,
            total_tenants: store.tenants().len(),
        }
    }

    /// Balance rows for every tenant, ordered by name.
    pub fn tenant_balances<S: RecordStore>(store: &S, today: NaiveDate) -> Vec<TenantBalanceRow> {
        let month = MonthKey::from_date(today);
        let mut rows: Vec<TenantBalanceRow> = store
            .tenants()
            .iter()
            .map(|tenant| Self::row(store, tenant, month, today))
            .collect();
        rows.sort_by_key(|row| row.name.to_lowercase());
        rows
    }

    pub fn dashboard<S: RecordStore>(store: &S, today: NaiveDate, options: &ReportOptions) -> Dashboard {
        let month = MonthKey::from_date(today);
        let rows = Self::tenant_balances(store, today);
        let total_arrears = rows.iter().map(|row| row.snapshot.remaining()).sum();

        let mut recent = rows;
        recent.sort_by(|a, b| b.move_in_date.cmp(&a.move_in_date));
        recent.truncate(options.recent_limit);

        Dashboard {
            month,
            stats: Self::occupancy(store),
            total_arrears,
            recent_tenants: recent,
            reminders: Self::reminders(store, today, &options.thresholds),
        }
    }

    pub fn analytics<S: RecordStore>(store: &S, today: NaiveDate) -> Analytics {
        let month = MonthKey::from_date(today);
        let rows = Self::tenant_balances(store, today);
        let total_arrears = rows.iter().map(|row| row.snapshot.remaining()).sum();
        let total_credit = rows.iter().map(|row| row.snapshot.new_credit()).sum();
        let total_expected = rows.iter().map(|row| row.snapshot.balance.monthly_rent).sum();
        let collected_this_month = store
            .payments()
            .iter()
            .filter(|payment| month.contains(payment.date))
            .map(|payment| payment.amount)
            .sum();
        let (arrears_tenants, rest): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|row| row.snapshot.classification() == BalanceClass::Arrears);
        let credit_tenants = rest
            .into_iter()
            .filter(|row| row.snapshot.classification() == BalanceClass::Credit)
            .collect();

        Analytics {
            month,
            arrears_tenants,
            credit_tenants,
            total_arrears,
            total_credit,
            total_expected,
            collected_this_month,
            stats: Self::occupancy(store),
        }
    }

    /// Reminder feed for tenants with an outstanding balance, ordered by name.
    pub fn reminders<S: RecordStore>(
        store: &S,
        today: NaiveDate,
        thresholds: &ReminderThresholds,
    ) -> Vec<ReminderCard> {
        let month = MonthKey::from_date(today);
        let mut cards: Vec<ReminderCard> = store
            .tenants()
            .iter()
            .filter_map(|tenant| {
                let snapshot = BalanceService::snapshot_for(store, tenant, month);
                let level = classify_reminder_with(
                    thresholds,
                    snapshot.remaining(),
                    tenant.last_payment_date,
                    today,
                )?;
                Some(ReminderCard {
                    tenant_id: tenant.id,
                    tenant_name: tenant.name.clone(),
                    room_number: room_number(store, tenant),
                    amount_remaining: snapshot.remaining(),
                    days_since_payment: days_since(tenant.last_payment_date, today),
                    level,
                })
            })
            .collect();
        cards.sort_by_key(|card| card.tenant_name.to_lowercase());
        cards
    }

    fn row<S: RecordStore>(store: &S, tenant: &Tenant, month: MonthKey, today: NaiveDate) -> TenantBalanceRow {
        TenantBalanceRow {
            tenant_id: tenant.id,
            name: tenant.name.clone(),
            phone: tenant.phone.clone(),
            room_number: room_number(store, tenant),
            move_in_date: tenant.move_in_date,
            last_payment_date: tenant.last_payment_date,
            days_since_payment: tenant
                .last_payment_date
                .map(|date| days_since(Some(date), today)),
            snapshot: BalanceService::snapshot_for(store, tenant, month),
        }
    }
}

fn room_number<S: RecordStore>(store: &S, tenant: &Tenant) -> Option<String> {
    tenant
        .room_id
        .and_then(|id| store.get_room(id).ok())
        .map(|room| room.number.clone())
}
