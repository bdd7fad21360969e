//! rentbook-domain
//!
//! Pure domain models (RentBook, Room, Tenant, Payment, Money, MonthKey).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod book;
pub mod common;
pub mod money;
pub mod month;
pub mod payment;
pub mod room;
pub mod tenant;

pub use book::*;
pub use common::*;
pub use money::*;
pub use month::*;
pub use payment::*;
pub use room::*;
pub use tenant::*;
