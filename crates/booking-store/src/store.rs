use std::sync::Arc;

use async_trait::async_trait;

use crate::{BookingId, BookingQuery, BookingRecord, BookingStatus, NewBooking, Result};

/// Core trait for booking repository implementations.
///
/// A booking repository persists booking rows and answers filtered queries.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts a new booking in `WAITING` status and returns the stored row.
    async fn insert(&self, booking: NewBooking) -> Result<BookingRecord>;

    /// Retrieves a booking by id.
    ///
    /// Returns None if the booking doesn't exist.
    async fn get(&self, id: BookingId) -> Result<Option<BookingRecord>>;

    /// Retrieves bookings matching a query, ordered as the query requests.
    async fn query(&self, query: BookingQuery) -> Result<Vec<BookingRecord>>;

    /// Atomically moves a booking from `expected` to `next`.
    ///
    /// Fails with `StatusConflict` if the stored status is not `expected`,
    /// and with `BookingNotFound` if the row is absent. Either way nothing
    /// is written.
    async fn transition_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<BookingRecord>;
}

/// Extension trait providing convenience methods for booking repositories.
#[async_trait]
pub trait BookingRepositoryExt: BookingRepository {
    /// Checks if a booking exists.
    async fn exists(&self, id: BookingId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Returns the first booking matching the query, if any.
    async fn first(&self, query: BookingQuery) -> Result<Option<BookingRecord>> {
        Ok(self.query(query.limit(1)).await?.into_iter().next())
    }
}

// Blanket implementation for all BookingRepository implementations
impl<T: BookingRepository + ?Sized> BookingRepositoryExt for T {}

#[async_trait]
impl<T: BookingRepository + ?Sized> BookingRepository for Arc<T> {
    async fn insert(&self, booking: NewBooking) -> Result<BookingRecord> {
        (**self).insert(booking).await
    }

    async fn get(&self, id: BookingId) -> Result<Option<BookingRecord>> {
        (**self).get(id).await
    }

    async fn query(&self, query: BookingQuery) -> Result<Vec<BookingRecord>> {
        (**self).query(query).await
    }

    async fn transition_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<BookingRecord> {
        (**self).transition_status(id, expected, next).await
    }
}
