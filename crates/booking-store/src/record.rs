use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{BookingId, BookingStatus, ItemId, UserId};

/// Sub-second digits kept by `timestamptz`.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// Truncates `instant` to the precision bookings are stored at.
///
/// Every adapter persists microseconds, so values compared before and after
/// a round trip must be trimmed the same way.
pub fn to_stored_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// A persisted booking row.
///
/// The item owner is not stored here; it is derived through `item_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: ItemId,
    pub booker_id: UserId,
    pub status: BookingStatus,
}

/// Insert payload for a booking. The repository assigns the id and writes
/// the initial `WAITING` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: ItemId,
    pub booker_id: UserId,
}

impl NewBooking {
    /// Builds the payload with both ends at stored precision.
    pub fn new(item_id: ItemId, booker_id: UserId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: to_stored_precision(start),
            end: to_stored_precision(end),
            item_id,
            booker_id,
        }
    }

    /// Materializes the row with a fresh id and the initial status.
    pub fn into_record(self) -> BookingRecord {
        BookingRecord {
            id: BookingId::new(),
            start: self.start,
            end: self.end,
            item_id: self.item_id,
            booker_id: self.booker_id,
            status: BookingStatus::Waiting,
        }
    }
}
