//! Time and status partitions for booking listings.

use std::str::FromStr;

use booking_store::{BookingQuery, BookingStatus};
use chrono::{DateTime, Utc};

use crate::error::BookingError;

/// Which side of a booking a listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Bookings the user requested.
    Booker,
    /// Bookings of items the user owns.
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Booker => "booker",
            Role::Owner => "owner",
        }
    }
}

/// A named partition of a user's bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    All,
    /// `start <= now < end`
    Current,
    /// `end < now`
    Past,
    /// `start > now`
    Future,
    Waiting,
    Rejected,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::All => "ALL",
            SearchMode::Current => "CURRENT",
            SearchMode::Past => "PAST",
            SearchMode::Future => "FUTURE",
            SearchMode::Waiting => "WAITING",
            SearchMode::Rejected => "REJECTED",
        }
    }

    /// Narrows a role-scoped query to this partition, evaluated at `now`.
    pub fn apply(&self, query: BookingQuery, now: DateTime<Utc>) -> BookingQuery {
        match self {
            SearchMode::All => query,
            SearchMode::Current => query.start_at_or_before(now).end_after(now),
            SearchMode::Past => query.end_before(now),
            SearchMode::Future => query.start_after(now),
            SearchMode::Waiting => query.status(BookingStatus::Waiting),
            SearchMode::Rejected => query.status(BookingStatus::Rejected),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = BookingError;

    /// Case-insensitive. Unknown names are an error, never `ALL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(SearchMode::All),
            "CURRENT" => Ok(SearchMode::Current),
            "PAST" => Ok(SearchMode::Past),
            "FUTURE" => Ok(SearchMode::Future),
            "WAITING" => Ok(SearchMode::Waiting),
            "REJECTED" => Ok(SearchMode::Rejected),
            _ => Err(BookingError::InvalidSearchMode(s.to_string())),
        }
    }
}
