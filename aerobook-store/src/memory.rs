//! In-process repositories for tests and database-less local runs.

use aerobook_core::repository::{BookingRepository, EmailLogRepository, RepositoryError};
use aerobook_core::{Booking, EmailLog};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Bookings keyed by reference code. The existence check and the insert run
/// under one write lock, which plays the role of the unique constraint.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<String, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn reference_exists(&self, pnr: &str) -> Result<bool, RepositoryError> {
        Ok(self.bookings.read().await.contains_key(pnr))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.pnr) {
            return Err(RepositoryError::DuplicateReference(booking.pnr.clone()));
        }
        bookings.insert(booking.pnr.clone(), booking.clone());
        Ok(())
    }

    async fn find_by_reference(&self, pnr: &str) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.bookings.read().await.get(pnr).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryEmailLogRepository {
    entries: RwLock<Vec<EmailLog>>,
}

impl InMemoryEmailLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmailLogRepository for InMemoryEmailLogRepository {
    async fn append(&self, entry: &EmailLog) -> Result<i64, RepositoryError> {
        let mut entries = self.entries.write().await;
        let id = entries.len() as i64 + 1;
        entries.push(EmailLog { id, ..entry.clone() });
        Ok(id)
    }

    async fn list_for_reference(&self, pnr: &str) -> Result<Vec<EmailLog>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.pnr == pnr)
            .cloned()
            .collect())
    }
}
