use std::collections::HashSet;

use rentbook_domain::RoomStatus;
use uuid::Uuid;

use crate::{store::RecordStore, CoreError};

/// Recomputes every room's status from tenant references.
///
/// Returns the number of rooms whose status changed.
pub fn refresh_occupancy<S: RecordStore>(store: &mut S) -> Result<usize, CoreError> {
    let occupied: HashSet<Uuid> = store
        .tenants()
        .iter()
        .filter_map(|tenant| tenant.room_id)
        .collect();
    let changes: Vec<(Uuid, RoomStatus)> = store
        .rooms()
        .iter()
        .filter_map(|room| {
            let status = if occupied.contains(&room.id) {
                RoomStatus::Occupied
            } else {
                RoomStatus::Vacant
            };
            (room.status != status).then_some((room.id, status))
        })
        .collect();
    for (id, status) in &changes {
        store.set_room_status(*id, *status)?;
    }
    Ok(changes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rentbook_domain::{Money, RentBook, Room, Tenant};

    #[test]
    fn status_follows_tenant_references() {
        let mut book = RentBook::new("Occupancy");
        let first = book
            .insert_room(Room::new("1", "single", Money::from_major(100)))
            .unwrap();
        let second = book
            .insert_room(Room::new("2", "single", Money::from_major(100)))
            .unwrap();
        let tenant = Tenant::new("T", "0", Some(first), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let tenant_id = book.insert_tenant(tenant).unwrap();

        assert_eq!(refresh_occupancy(&mut book).unwrap(), 1);
        assert_eq!(book.get_room(first).unwrap().status, RoomStatus::Occupied);
        assert_eq!(book.get_room(second).unwrap().status, RoomStatus::Vacant);

        book.tenant_mut(tenant_id).unwrap().room_id = Some(second);
        assert_eq!(refresh_occupancy(&mut book).unwrap(), 2);
        assert_eq!(book.get_room(first).unwrap().status, RoomStatus::Vacant);
        assert_eq!(book.get_room(second).unwrap().status, RoomStatus::Occupied);
    }
}
