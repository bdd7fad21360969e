//! rentbook-core
//!
//! Rent ledger engine and services for Rentbook.
//! Depends on rentbook-domain. No CLI, no terminal I/O, no direct file access.

pub mod balance_service;
pub mod cache;
pub mod error;
pub mod ledger;
pub mod occupancy;
pub mod payment_service;
pub mod reminder;
pub mod report_service;
pub mod room_service;
pub mod storage;
pub mod store;
pub mod tenant_service;
pub mod time;

pub use balance_service::*;
pub use cache::*;
pub use error::CoreError;
pub use ledger::*;
pub use occupancy::*;
pub use payment_service::*;
pub use reminder::*;
pub use report_service::*;
pub use room_service::*;
pub use store::RecordStore;
pub use tenant_service::*;
pub use time::{Clock, FixedClock};
