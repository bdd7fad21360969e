//! Record store abstraction the services operate on.

use chrono::NaiveDate;
use rentbook_domain::{Money, MonthKey, Payment, RentBook, Room, RoomStatus, Tenant};
use uuid::Uuid;

use crate::{ledger::CreditState, CoreError};

/// Storage of rooms, tenants and payments for one property.
///
/// Reads return borrowed records; writes return `CoreError` on missing
/// references or uniqueness violations.
pub trait RecordStore {
    fn rooms(&self) -> &[Room];
    fn tenants(&self) -> &[Tenant];
    fn payments(&self) -> &[Payment];

    fn get_room(&self, id: Uuid) -> Result<&Room, CoreError> {
        self.rooms()
            .iter()
            .find(|room| room.id == id)
            .ok_or_else(|| CoreError::RoomNotFound(id.to_string()))
    }

    fn get_tenant(&self, id: Uuid) -> Result<&Tenant, CoreError> {
        self.tenants()
            .iter()
            .find(|tenant| tenant.id == id)
            .ok_or(CoreError::TenantNotFound(id))
    }

    fn get_payment(&self, id: Uuid) -> Result<&Payment, CoreError> {
        self.payments()
            .iter()
            .find(|payment| payment.id == id)
            .ok_or(CoreError::PaymentNotFound(id))
    }

    /// Total paid by `tenant_id` within `month`.
    fn sum_payments(&self, tenant_id: Uuid, month: MonthKey) -> Money {
        self.payments()
            .iter()
            .filter(|payment| payment.tenant_id == tenant_id && month.contains(payment.date))
            .map(|payment| payment.amount)
            .sum()
    }

    /// Payments of `tenant_id`, most recent first.
    fn list_payments(&self, tenant_id: Uuid) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments()
            .iter()
            .filter(|payment| payment.tenant_id == tenant_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        payments
    }

    fn insert_room(&mut self, room: Room) -> Result<Uuid, CoreError>;
    fn update_room(&mut self, room: Room) -> Result<(), CoreError>;
    fn remove_room(&mut self, id: Uuid) -> Result<Room, CoreError>;
    fn set_room_status(&mut self, id: Uuid, status: RoomStatus) -> Result<(), CoreError>;

    fn insert_tenant(&mut self, tenant: Tenant) -> Result<Uuid, CoreError>;
    fn update_tenant(&mut self, tenant: Tenant) -> Result<(), CoreError>;
    fn remove_tenant(&mut self, id: Uuid) -> Result<Tenant, CoreError>;
    fn update_tenant_credit(&mut self, id: Uuid, credit: CreditState) -> Result<(), CoreError>;
    fn update_tenant_last_payment(
        &mut self,
        id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<(), CoreError>;

    fn insert_payment(&mut self, payment: Payment) -> Result<Uuid, CoreError>;
    fn remove_payment(&mut self, id: Uuid) -> Result<Payment, CoreError>;

    /// Runs `work` so that either all of its writes land or none do.
    fn transaction<T, F>(&mut self, work: F) -> Result<T, CoreError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, CoreError>;
}

impl RecordStore for RentBook {
    fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    fn payments(&self) -> &[Payment] {
        &self.payments
    }

    fn insert_room(&mut self, room: Room) -> Result<Uuid, CoreError> {
        ensure_unique_number(self, None, &room.number)?;
        let id = room.id;
        self.rooms.push(room);
        self.touch();
        Ok(id)
    }

    fn update_room(&mut self, room: Room) -> Result<(), CoreError> {
        ensure_unique_number(self, Some(room.id), &room.number)?;
        let slot = self
            .room_mut(room.id)
            .ok_or_else(|| CoreError::RoomNotFound(room.id.to_string()))?;
        *slot = room;
        self.touch();
        Ok(())
    }

    fn remove_room(&mut self, id: Uuid) -> Result<Room, CoreError> {
        let index = self
            .rooms
            .iter()
            .position(|room| room.id == id)
            .ok_or_else(|| CoreError::RoomNotFound(id.to_string()))?;
        let room = self.rooms.remove(index);
        self.touch();
        Ok(room)
    }

    fn set_room_status(&mut self, id: Uuid, status: RoomStatus) -> Result<(), CoreError> {
        let room = self
            .room_mut(id)
            .ok_or_else(|| CoreError::RoomNotFound(id.to_string()))?;
        room.status = status;
        Ok(())
    }

    fn insert_tenant(&mut self, tenant: Tenant) -> Result<Uuid, CoreError> {
        if self.tenant(tenant.id).is_some() {
            return Err(CoreError::Conflict(format!(
                "tenant {} already exists",
                tenant.id
            )));
        }
        let id = tenant.id;
        self.tenants.push(tenant);
        self.touch();
        Ok(id)
    }

    fn update_tenant(&mut self, tenant: Tenant) -> Result<(), CoreError> {
        let slot = self
            .tenant_mut(tenant.id)
            .ok_or(CoreError::TenantNotFound(tenant.id))?;
        *slot = tenant;
        self.touch();
        Ok(())
    }

    fn remove_tenant(&mut self, id: Uuid) -> Result<Tenant, CoreError> {
        let index = self
            .tenants
            .iter()
            .position(|tenant| tenant.id == id)
            .ok_or(CoreError::TenantNotFound(id))?;
        let tenant = self.tenants.remove(index);
        self.touch();
        Ok(tenant)
    }

    fn update_tenant_credit(&mut self, id: Uuid, credit: CreditState) -> Result<(), CoreError> {
        let tenant = self.tenant_mut(id).ok_or(CoreError::TenantNotFound(id))?;
        credit.apply_to(tenant);
        self.touch();
        Ok(())
    }

    fn update_tenant_last_payment(
        &mut self,
        id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<(), CoreError> {
        let tenant = self.tenant_mut(id).ok_or(CoreError::TenantNotFound(id))?;
        tenant.last_payment_date = date;
        self.touch();
        Ok(())
    }

    fn insert_payment(&mut self, payment: Payment) -> Result<Uuid, CoreError> {
        if self.tenant(payment.tenant_id).is_none() {
            return Err(CoreError::TenantNotFound(payment.tenant_id));
        }
        let id = payment.id;
        self.payments.push(payment);
        self.touch();
        Ok(id)
    }

    fn remove_payment(&mut self, id: Uuid) -> Result<Payment, CoreError> {
        let index = self
            .payments
            .iter()
            .position(|payment| payment.id == id)
            .ok_or(CoreError::PaymentNotFound(id))?;
        let payment = self.payments.remove(index);
        self.touch();
        Ok(payment)
    }

    fn transaction<T, F>(&mut self, work: F) -> Result<T, CoreError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, CoreError>,
    {
        let mut working = self.clone();
        let value = work(&mut working)?;
        *self = working;
        Ok(value)
    }
}

fn ensure_unique_number(book: &RentBook, exclude: Option<Uuid>, number: &str) -> Result<(), CoreError> {
    let duplicate = book
        .rooms
        .iter()
        .any(|room| room.has_number(number) && exclude.map_or(true, |id| room.id != id));
    if duplicate {
        Err(CoreError::Conflict(format!(
            "room `{}` already exists",
            number.trim()
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_room() -> (RentBook, Uuid) {
        let mut book = RentBook::new("Store");
        let id = book
            .insert_room(Room::new("A1", "single", Money::from_major(5_000)))
            .unwrap();
        (book, id)
    }

    #[test]
    fn duplicate_room_numbers_conflict() {
        let (mut book, _) = book_with_room();
        let err = book
            .insert_room(Room::new(" a1 ", "double", Money::ZERO))
            .expect_err("duplicate must fail");
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn failed_transaction_leaves_store_untouched() {
        let (mut book, room_id) = book_with_room();
        let result: Result<(), CoreError> = book.transaction(|store| {
            store.remove_room(room_id)?;
            Err(CoreError::InvalidInput("abort".into()))
        });
        assert!(result.is_err());
        assert!(book.get_room(room_id).is_ok());
    }

    #[test]
    fn payments_listed_most_recent_first() {
        let mut book = RentBook::new("Order");
        let tenant = Tenant::new("T", "1", None, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let tenant_id = book.insert_tenant(tenant).unwrap();
        for day in [3, 17, 9] {
            book.insert_payment(Payment::new(
                tenant_id,
                Money::from_major(1),
                NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
                None,
            ))
            .unwrap();
        }
        let days: Vec<u32> = book
            .list_payments(tenant_id)
            .iter()
            .map(|payment| chrono::Datelike::day(&payment.date))
            .collect();
        assert_eq!(days, vec![17, 9, 3]);
    }

    #[test]
    fn payment_for_unknown_tenant_is_rejected() {
        let mut book = RentBook::new("Orphan");
        let err = book
            .insert_payment(Payment::new(
                Uuid::new_v4(),
                Money::from_major(1),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                None,
            ))
            .expect_err("tenant is missing");
        assert!(err.is_not_found());
        assert!(book.payments.is_empty());
    }
}
