//! Booking request payloads.

use booking_store::{ItemId, to_stored_precision};
use chrono::{DateTime, Utc};

use crate::error::{BookingError, Result};

/// A booking request as received from a caller. Every field may be absent.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub item_id: Option<ItemId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A booking request whose fields are present and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub item_id: ItemId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingRequest {
    /// Creates a request with every field present.
    pub fn new(item_id: ItemId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            item_id: Some(item_id),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Checks presence and `start < end` at stored precision.
    ///
    /// The returned period is truncated to microseconds, so it matches what
    /// a later read of the booking returns.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let item_id = self
            .item_id
            .ok_or_else(|| BookingError::MalformedRequest("item id is required".to_string()))?;
        let start = self
            .start
            .map(to_stored_precision)
            .ok_or_else(|| BookingError::MalformedRequest("start is required".to_string()))?;
        let end = self
            .end
            .map(to_stored_precision)
            .ok_or_else(|| BookingError::MalformedRequest("end is required".to_string()))?;

        if start > end {
            return Err(BookingError::MalformedRequest(format!(
                "start {start} is after end {end}"
            )));
        }
        if start == end {
            return Err(BookingError::MalformedRequest(format!(
                "start and end are both {start}"
            )));
        }

        Ok(ValidatedRequest {
            item_id,
            start,
            end,
        })
    }
}
