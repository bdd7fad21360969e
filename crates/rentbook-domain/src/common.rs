//! Shared helpers for rent book records.

use uuid::Uuid;

/// Converts a record into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Returns the first eight characters of an identifier, used as a short handle in listings.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
