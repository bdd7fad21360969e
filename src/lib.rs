//! Rentbook keeps a landlord's rooms, tenants and rent payments, computes
//! monthly balances with rolled-over credit and flags overdue tenants.
//!
//! The heavy lifting lives in the workspace crates; this crate wires them
//! together behind [`BookManager`] and the `rentbook` shell.

pub mod cli;
pub mod manager;
pub mod utils;

pub use manager::{BookManager, ManagerError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing once per process.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("rentbook tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
