use async_trait::async_trait;

use crate::booking::{Booking, EmailLog};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Reference code already in use: {0}")]
    DuplicateReference(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Repository trait for booking data access.
///
/// `insert_booking` must reject a reference code that is already taken with
/// `DuplicateReference` rather than overwrite the existing row.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn reference_exists(&self, pnr: &str) -> Result<bool, RepositoryError>;

    async fn insert_booking(&self, booking: &Booking) -> Result<(), RepositoryError>;

    async fn find_by_reference(&self, pnr: &str) -> Result<Option<Booking>, RepositoryError>;
}

/// Append-only log of confirmation e-mails.
#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    /// Stores the entry and returns its assigned id; `entry.id` is ignored.
    async fn append(&self, entry: &EmailLog) -> Result<i64, RepositoryError>;

    async fn list_for_reference(&self, pnr: &str) -> Result<Vec<EmailLog>, RepositoryError>;
}
