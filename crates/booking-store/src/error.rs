use thiserror::Error;

use crate::{BookingId, BookingStatus};

/// Errors that can occur when interacting with the booking stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional status update found a different status than expected.
    /// Nothing was written.
    #[error(
        "Status conflict for booking {booking_id}: expected {expected}, found {actual}"
    )]
    StatusConflict {
        booking_id: BookingId,
        expected: BookingStatus,
        actual: BookingStatus,
    },

    /// The booking was not found.
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be decoded into a domain value.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<common::UnknownStatus> for StoreError {
    fn from(err: common::UnknownStatus) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
