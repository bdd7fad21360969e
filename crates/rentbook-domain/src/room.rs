//! Rentable rooms.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Money};

/// A rentable room with its monthly rent obligation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub number: String,
    pub room_type: String,
    pub monthly_rent: Money,
    /// Projection of tenant occupancy, recomputed after every tenant mutation.
    #[serde(default)]
    pub status: RoomStatus,
}

impl Room {
    pub fn new(number: impl Into<String>, room_type: impl Into<String>, monthly_rent: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into().trim().to_string(),
            room_type: room_type.into(),
            monthly_rent,
            status: RoomStatus::Vacant,
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.status == RoomStatus::Vacant
    }

    /// Compares room numbers case-insensitively after trimming.
    pub fn has_number(&self, number: &str) -> bool {
        self.number.eq_ignore_ascii_case(number.trim())
    }
}

impl Displayable for Room {
    fn display_label(&self) -> String {
        format!("Room {} ({})", self.number, self.room_type)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Vacant,
    Occupied,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoomStatus::Vacant => "vacant",
            RoomStatus::Occupied => "occupied",
        };
        f.write_str(label)
    }
}
