use std::{
    collections::HashSet,
    path::PathBuf,
};

use rentbook_domain::{RentBook, RoomStatus};

use crate::CoreError;

/// Describes a persisted backup artifact for a book.
#[derive(Debug, Clone)]
pub struct BookBackupInfo {
    pub book: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing rent books and backups.
pub trait BookStorage: Send + Sync {
    /// Writes `book` under `name` and returns the revision that was stored.
    ///
    /// `expected_revision` is the revision the caller loaded, or `None` when
    /// creating a new book. A mismatch with what is on disk is a `Conflict`.
    fn save_book(
        &self,
        name: &str,
        book: &RentBook,
        expected_revision: Option<u64>,
    ) -> Result<u64, CoreError>;
    fn load_book(&self, name: &str) -> Result<RentBook, CoreError>;
    fn list_books(&self) -> Result<Vec<String>, CoreError>;
    fn delete_book(&self, name: &str) -> Result<(), CoreError>;
    fn backup_book(
        &self,
        name: &str,
        book: &RentBook,
        note: Option<&str>,
    ) -> Result<BookBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<BookBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<RentBook, CoreError>;
}

/// Detects dangling references and stale projections within a book snapshot.
pub fn book_warnings(book: &RentBook) -> Vec<String> {
    let room_ids: HashSet<_> = book.rooms.iter().map(|room| room.id).collect();
    let tenant_ids: HashSet<_> = book.tenants.iter().map(|tenant| tenant.id).collect();
    let mut warnings = Vec::new();

    for tenant in &book.tenants {
        if let Some(room_id) = tenant.room_id {
            if !room_ids.contains(&room_id) {
                warnings.push(format!(
                    "tenant {} references missing room {}",
                    tenant.id, room_id
                ));
            }
        }
        if tenant.credit_balance.is_negative() {
            warnings.push(format!("tenant {} has negative credit", tenant.id));
        }
    }
    for payment in &book.payments {
        if !tenant_ids.contains(&payment.tenant_id) {
            warnings.push(format!(
                "payment {} references unknown tenant {}",
                payment.id, payment.tenant_id
            ));
        }
    }
    for room in &book.rooms {
        let occupied = book.tenants_in_room(room.id).next().is_some();
        let expected = if occupied {
            RoomStatus::Occupied
        } else {
            RoomStatus::Vacant
        };
        if room.status != expected {
            warnings.push(format!(
                "room {} is marked {} but is {}",
                room.number, room.status, expected
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rentbook_domain::{Money, Payment, Room, Tenant};
    use uuid::Uuid;

    #[test]
    fn flags_dangling_references_and_stale_status() {
        let mut book = RentBook::new("Warnings");
        book.rooms.push(Room::new("1", "single", Money::ZERO));
        let tenant = Tenant::new(
            "Ghost",
            "0",
            Some(Uuid::new_v4()),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        book.tenants.push(tenant);
        book.payments.push(Payment::new(
            Uuid::new_v4(),
            Money::from_major(1),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            None,
        ));
        book.rooms[0].status = RoomStatus::Occupied;

        let warnings = book_warnings(&book);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
    }

    #[test]
    fn consistent_book_has_no_warnings() {
        assert!(book_warnings(&RentBook::new("Clean")).is_empty());
    }
}
