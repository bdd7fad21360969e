//! The rent book aggregate: every room, tenant and payment of one property.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{payment::Payment, room::Room, tenant::Tenant};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentBook {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "RentBook::schema_version_default")]
    pub schema_version: u8,
    /// Save counter used by storage backends to detect concurrent writers.
    #[serde(default)]
    pub revision: u64,
}

impl RentBook {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rooms: Vec::new(),
            tenants: Vec::new(),
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
            revision: 0,
        }
    }

    pub fn room(&self, id: Uuid) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn room_mut(&mut self, id: Uuid) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.id == id)
    }

    pub fn room_by_number(&self, number: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.has_number(number))
    }

    pub fn tenant(&self, id: Uuid) -> Option<&Tenant> {
        self.tenants.iter().find(|tenant| tenant.id == id)
    }

    pub fn tenant_mut(&mut self, id: Uuid) -> Option<&mut Tenant> {
        self.tenants.iter_mut().find(|tenant| tenant.id == id)
    }

    pub fn payment(&self, id: Uuid) -> Option<&Payment> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    /// Tenants currently referencing `room_id`.
    pub fn tenants_in_room(&self, room_id: Uuid) -> impl Iterator<Item = &Tenant> + '_ {
        self.tenants
            .iter()
            .filter(move |tenant| tenant.room_id == Some(room_id))
    }

    pub fn payments_for(&self, tenant_id: Uuid) -> impl Iterator<Item = &Payment> + '_ {
        self.payments
            .iter()
            .filter(move |payment| payment.tenant_id == tenant_id)
    }

    /// Room number of the tenant's room, if assigned.
    pub fn room_number_for(&self, tenant: &Tenant) -> Option<&str> {
        tenant
            .room_id
            .and_then(|id| self.room(id))
            .map(|room| room.number.as_str())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::NaiveDate;

    #[test]
    fn lookups_resolve_relations() {
        let mut book = RentBook::new("Sunrise Flats");
        let room = Room::new("7", "studio", Money::from_major(12_000));
        let room_id = room.id;
        book.rooms.push(room);
        let tenant = Tenant::new(
            "Alice",
            "0700",
            Some(room_id),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let tenant_id = tenant.id;
        book.tenants.push(tenant);

        assert_eq!(book.room_by_number(" 7 ").map(|room| room.id), Some(room_id));
        assert_eq!(book.tenants_in_room(room_id).count(), 1);
        let tenant = book.tenant(tenant_id).unwrap();
        assert_eq!(book.room_number_for(tenant), Some("7"));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "name": "Legacy",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let book: RentBook = serde_json::from_str(json).unwrap();
        assert_eq!(book.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(book.revision, 0);
        assert!(book.rooms.is_empty());
    }
}
