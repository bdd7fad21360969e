use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Tenant not found: {0}")]
    TenantNotFound(Uuid),
    #[error("Room not found: {0}")]
    RoomNotFound(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),
    #[error("Book not found: {0}")]
    BookNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::TenantNotFound(_)
                | CoreError::RoomNotFound(_)
                | CoreError::PaymentNotFound(_)
                | CoreError::BookNotFound(_)
        )
    }
}
