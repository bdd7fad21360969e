//! Tenant records, occupancy-aware.

use chrono::NaiveDate;
use rentbook_domain::{Money, MonthKey, Payment, Room, Tenant};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    balance_service::BalanceService, ledger::BalanceSnapshot, occupancy::refresh_occupancy,
    store::RecordStore, CoreError,
};

/// Field changes applied by [`TenantService::update`]. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    /// `Some(None)` moves the tenant out of their room.
    pub room_id: Option<Option<Uuid>>,
    pub id_number: Option<String>,
    pub relative_name: Option<String>,
    pub relative_contact: Option<String>,
    pub relative_id_number: Option<String>,
}

/// Everything the tenant detail view shows.
#[derive(Debug, Clone, Serialize)]
pub struct TenantDetail {
    pub tenant: Tenant,
    pub room: Option<Room>,
    pub snapshot: BalanceSnapshot,
    pub total_paid: Money,
    /// Most recent first.
    pub payments: Vec<Payment>,
}

pub struct TenantService;

impl TenantService {
    /// Adds a tenant. An assigned room must exist and be vacant.
    pub fn add<S: RecordStore>(store: &mut S, mut tenant: Tenant) -> Result<Uuid, CoreError> {
        tenant.name = tenant.name.trim().to_string();
        tenant.phone = tenant.phone.trim().to_string();
        Self::validate(&tenant)?;
        if let Some(room_id) = tenant.room_id {
            Self::ensure_room_available(store, room_id, None)?;
        }
        let id = store.transaction(|store| {
            let id = store.insert_tenant(tenant)?;
            refresh_occupancy(store)?;
            Ok(id)
        })?;
        info!(tenant = %id, "tenant added");
        Ok(id)
    }

    pub fn update<S: RecordStore>(
        store: &mut S,
        id: Uuid,
        changes: TenantUpdate,
    ) -> Result<(), CoreError> {
        let mut tenant = store.get_tenant(id)?.clone();
        if let Some(name) = changes.name {
            tenant.name = name.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            tenant.phone = phone.trim().to_string();
        }
        if let Some(date) = changes.move_in_date {
            tenant.move_in_date = date;
        }
        if let Some(room_id) = changes.room_id {
            if let Some(target) = room_id {
                Self::ensure_room_available(store, target, Some(id))?;
            }
            tenant.room_id = room_id;
        }
        merge_field(&mut tenant.identity.id_number, changes.id_number);
        merge_field(&mut tenant.identity.relative_name, changes.relative_name);
        merge_field(&mut tenant.identity.relative_contact, changes.relative_contact);
        merge_field(
            &mut tenant.identity.relative_id_number,
            changes.relative_id_number,
        );
        Self::validate(&tenant)?;
        store.transaction(|store| {
            store.update_tenant(tenant)?;
            refresh_occupancy(store)?;
            Ok(())
        })?;
        info!(tenant = %id, "tenant updated");
        Ok(())
    }

    /// Removes a tenant together with their payments.
    pub fn remove<S: RecordStore>(store: &mut S, id: Uuid) -> Result<Tenant, CoreError> {
        let tenant = store.transaction(|store| {
            let payment_ids: Vec<Uuid> = store
                .payments()
                .iter()
                .filter(|payment| payment.tenant_id == id)
                .map(|payment| payment.id)
                .collect();
            let tenant = store.remove_tenant(id)?;
            for payment_id in &payment_ids {
                store.remove_payment(*payment_id)?;
            }
            debug!(tenant = %id, payments = payment_ids.len(), "cascaded payment removal");
            refresh_occupancy(store)?;
            Ok(tenant)
        })?;
        info!(tenant = %id, "tenant removed");
        Ok(tenant)
    }

    pub fn get<S: RecordStore>(store: &S, id: Uuid) -> Result<&Tenant, CoreError> {
        store.get_tenant(id)
    }

    /// All tenants ordered by name.
    pub fn list<S: RecordStore>(store: &S) -> Vec<&Tenant> {
        let mut tenants: Vec<&Tenant> = store.tenants().iter().collect();
        tenants.sort_by_key(|tenant| tenant.name.to_lowercase());
        tenants
    }

    /// Case-insensitive substring match over name, phone and room number.
    pub fn search<'a, S: RecordStore>(store: &'a S, query: &str) -> Vec<&'a Tenant> {
        let needle = query.trim().to_lowercase();
        Self::list(store)
            .into_iter()
            .filter(|tenant| {
                if needle.is_empty() {
                    return true;
                }
                let room_number = tenant
                    .room_id
                    .and_then(|id| store.get_room(id).ok())
                    .map(|room| room.number.to_lowercase())
                    .unwrap_or_default();
                tenant.name.to_lowercase().contains(&needle)
                    || tenant.phone.to_lowercase().contains(&needle)
                    || room_number.contains(&needle)
            })
            .collect()
    }

    /// Resolves a tenant by exact name (ignoring case) or by id prefix.
    pub fn find<'a, S: RecordStore>(store: &'a S, key: &str) -> Result<&'a Tenant, CoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CoreError::InvalidInput("tenant name or id is required".into()));
        }
        if let Some(tenant) = store
            .tenants()
            .iter()
            .find(|tenant| tenant.name.eq_ignore_ascii_case(key))
        {
            return Ok(tenant);
        }
        let prefix = key.to_lowercase().replace('-', "");
        let matches: Vec<&Tenant> = store
            .tenants()
            .iter()
            .filter(|tenant| tenant.id.simple().to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [tenant] => Ok(*tenant),
            [] => Err(CoreError::InvalidInput(format!("no tenant matches `{key}`"))),
            _ => Err(CoreError::InvalidInput(format!(
                "`{key}` matches {} tenants",
                matches.len()
            ))),
        }
    }

    pub fn detail<S: RecordStore>(
        store: &S,
        id: Uuid,
        month: MonthKey,
    ) -> Result<TenantDetail, CoreError> {
        let tenant = store.get_tenant(id)?;
        let room = tenant
            .room_id
            .and_then(|room_id| store.get_room(room_id).ok())
            .cloned();
        let payments = store.list_payments(id);
        let total_paid = payments.iter().map(|payment| payment.amount).sum();
        Ok(TenantDetail {
            tenant: tenant.clone(),
            room,
            snapshot: BalanceService::snapshot_for(store, tenant, month),
            total_paid,
            payments,
        })
    }

    fn validate(tenant: &Tenant) -> Result<(), CoreError> {
        if tenant.name.is_empty() {
            return Err(CoreError::InvalidInput("tenant name is required".into()));
        }
        if tenant.phone.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "phone number for `{}` is required",
                tenant.name
            )));
        }
        Ok(())
    }

    fn ensure_room_available<S: RecordStore>(
        store: &S,
        room_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<(), CoreError> {
        let room = store.get_room(room_id)?;
        let taken = store
            .tenants()
            .iter()
            .any(|other| other.room_id == Some(room_id) && Some(other.id) != tenant);
        if taken {
            Err(CoreError::Conflict(format!(
                "room `{}` is occupied",
                room.number
            )))
        } else {
            Ok(())
        }
    }
}

fn merge_field(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        *slot = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
}
