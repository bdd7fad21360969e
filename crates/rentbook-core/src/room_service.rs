//! Validated CRUD helpers for rooms.

use std::cmp::Ordering;

use rentbook_domain::{Money, Room};
use tracing::info;
use uuid::Uuid;

use crate::{occupancy::refresh_occupancy, store::RecordStore, CoreError};

/// Field changes applied by [`RoomService::update`]. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub number: Option<String>,
    pub room_type: Option<String>,
    pub monthly_rent: Option<Money>,
}

pub struct RoomService;

impl RoomService {
    /// Adds a room and returns its identifier.
    pub fn add<S: RecordStore>(store: &mut S, room: Room) -> Result<Uuid, CoreError> {
        Self::validate(&room)?;
        let id = store.transaction(|store| {
            let id = store.insert_room(room)?;
            refresh_occupancy(store)?;
            Ok(id)
        })?;
        info!(room = %id, "room added");
        Ok(id)
    }

    pub fn update<S: RecordStore>(
        store: &mut S,
        id: Uuid,
        changes: RoomUpdate,
    ) -> Result<(), CoreError> {
        let mut room = store.get_room(id)?.clone();
        if let Some(number) = changes.number {
            room.number = number.trim().to_string();
        }
        if let Some(room_type) = changes.room_type {
            room.room_type = room_type;
        }
        if let Some(rent) = changes.monthly_rent {
            room.monthly_rent = rent;
        }
        Self::validate(&room)?;
        store.transaction(|store| {
            store.update_room(room)?;
            refresh_occupancy(store)?;
            Ok(())
        })?;
        info!(room = %id, "room updated");
        Ok(())
    }

    /// Removes a vacant room. Rooms referenced by tenants are kept.
    pub fn remove<S: RecordStore>(store: &mut S, id: Uuid) -> Result<Room, CoreError> {
        let number = store.get_room(id)?.number.clone();
        if store.tenants().iter().any(|tenant| tenant.room_id == Some(id)) {
            return Err(CoreError::Conflict(format!(
                "room `{number}` still has tenants"
            )));
        }
        let room = store.transaction(|store| {
            let room = store.remove_room(id)?;
            refresh_occupancy(store)?;
            Ok(room)
        })?;
        info!(room = %id, "room removed");
        Ok(room)
    }

    pub fn get<S: RecordStore>(store: &S, id: Uuid) -> Result<&Room, CoreError> {
        store.get_room(id)
    }

    /// Looks a room up by number, ignoring case and surrounding whitespace.
    pub fn by_number<'a, S: RecordStore>(store: &'a S, number: &str) -> Result<&'a Room, CoreError> {
        store
            .rooms()
            .iter()
            .find(|room| room.has_number(number))
            .ok_or_else(|| CoreError::RoomNotFound(number.trim().to_string()))
    }

    /// All rooms ordered by number.
    pub fn list<S: RecordStore>(store: &S) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = store.rooms().iter().collect();
        rooms.sort_by(|a, b| compare_numbers(&a.number, &b.number));
        rooms
    }

    /// Vacant rooms ordered by number.
    pub fn available<S: RecordStore>(store: &S) -> Vec<&Room> {
        Self::list(store)
            .into_iter()
            .filter(|room| room.is_vacant())
            .collect()
    }

    fn validate(room: &Room) -> Result<(), CoreError> {
        if room.number.trim().is_empty() {
            return Err(CoreError::InvalidInput("room number is required".into()));
        }
        if room.monthly_rent.is_negative() {
            return Err(CoreError::InvalidInput(format!(
                "monthly rent for room `{}` cannot be negative",
                room.number
            )));
        }
        Ok(())
    }
}

/// Numeric room numbers sort numerically and before the rest, which sort lexically.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentbook_domain::RentBook;

    #[test]
    fn rooms_are_listed_in_natural_order() {
        let mut book = RentBook::new("Order");
        for number in ["10", "B", "2", "a"] {
            RoomService::add(&mut book, Room::new(number, "single", Money::ZERO)).unwrap();
        }
        let numbers: Vec<&str> = RoomService::list(&book)
            .iter()
            .map(|room| room.number.as_str())
            .collect();
        assert_eq!(numbers, vec!["2", "10", "a", "B"]);
    }

    #[test]
    fn negative_rent_is_rejected() {
        let mut book = RentBook::new("Rent");
        let err = RoomService::add(&mut book, Room::new("1", "single", Money::from_major(-1)))
            .expect_err("negative rent");
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(book.rooms.is_empty());
    }

    #[test]
    fn renaming_onto_existing_number_conflicts() {
        let mut book = RentBook::new("Rename");
        RoomService::add(&mut book, Room::new("1", "single", Money::ZERO)).unwrap();
        let second = RoomService::add(&mut book, Room::new("2", "single", Money::ZERO)).unwrap();
        let err = RoomService::update(
            &mut book,
            second,
            RoomUpdate {
                number: Some("1".into()),
                ..RoomUpdate::default()
            },
        )
        .expect_err("duplicate number");
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(RoomService::get(&book, second).unwrap().number, "2");
    }

    #[test]
    fn lookup_by_number_ignores_case() {
        let mut book = RentBook::new("Lookup");
        let id = RoomService::add(&mut book, Room::new("C3", "double", Money::from_major(9_000))).unwrap();
        assert_eq!(RoomService::by_number(&book, " c3").unwrap().id, id);
        assert!(RoomService::by_number(&book, "C4").unwrap_err().is_not_found());
    }
}
