//! Booking lifecycle: creation, owner decision, cancellation and
//! role-scoped search.

pub mod access;
mod commands;
mod engine;
mod search;
mod transition;

pub use commands::{BookingRequest, ValidatedRequest};
pub use engine::BookingEngine;
pub use search::{Role, SearchMode};
pub use transition::Decision;

use booking_store::{BookingId, BookingRecord, BookingStatus, Item, User, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A booking together with the item and booker it references.
///
/// Item and booker are snapshots taken when the booking is read. Only their
/// ids take part in authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub item: Item,
    pub booker: User,
}

impl Booking {
    pub(crate) fn from_parts(record: BookingRecord, item: Item, booker: User) -> Self {
        Self {
            id: record.id,
            start: record.start,
            end: record.end,
            status: record.status,
            item,
            booker,
        }
    }

    /// Returns the owner of the booked item.
    pub fn owner_id(&self) -> UserId {
        self.item.owner_id
    }

    /// Returns the persisted shape of this booking.
    pub fn record(&self) -> BookingRecord {
        BookingRecord {
            id: self.id,
            start: self.start,
            end: self.end,
            item_id: self.item.id,
            booker_id: self.booker.id,
            status: self.status,
        }
    }
}

/// The most recent and the upcoming booking of an item, as shown to its
/// owner. Rejected bookings are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemSchedule {
    pub last: Option<BookingRecord>,
    pub next: Option<BookingRecord>,
}
