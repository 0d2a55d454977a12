//! Booking status state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of a booking in its lifecycle.
///
/// State transitions:
/// ```text
/// Waiting ──┬──► Approved ──► Canceled
///           ├──► Rejected
///           └──► Canceled
/// ```
///
/// The owner's decision moves a booking out of `Waiting` exactly once.
/// `Canceled` is only reached through the booker's cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Requested by the booker, awaiting the owner's decision.
    #[default]
    Waiting,

    /// Accepted by the owner.
    Approved,

    /// Declined by the owner (terminal state).
    Rejected,

    /// Withdrawn by the booker (terminal state).
    Canceled,
}

impl BookingStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Waiting,
        BookingStatus::Approved,
        BookingStatus::Rejected,
        BookingStatus::Canceled,
    ];

    /// Returns true if the owner may still approve or reject.
    pub fn can_decide(&self) -> bool {
        matches!(self, BookingStatus::Waiting)
    }

    /// Returns true if the booker may still cancel.
    pub fn can_cancel(&self) -> bool {
        matches!(self, BookingStatus::Waiting | BookingStatus::Approved)
    }

    /// Returns the status name as stored and rendered.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_waiting() {
        assert_eq!(BookingStatus::default(), BookingStatus::Waiting);
    }

    #[test]
    fn only_waiting_can_be_decided() {
        assert!(BookingStatus::Waiting.can_decide());
        assert!(!BookingStatus::Approved.can_decide());
        assert!(!BookingStatus::Rejected.can_decide());
        assert!(!BookingStatus::Canceled.can_decide());
    }

    #[test]
    fn waiting_and_approved_can_be_cancelled() {
        assert!(BookingStatus::Waiting.can_cancel());
        assert!(BookingStatus::Approved.can_cancel());
        assert!(!BookingStatus::Rejected.can_cancel());
        assert!(!BookingStatus::Canceled.can_cancel());
    }

    #[test]
    fn string_form_roundtrips_through_from_str() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert!("PENDING".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn serializes_in_upper_case() {
        let json = serde_json::to_string(&BookingStatus::Approved).unwrap();
        assert_eq!(json, "\"APPROVED\"");
    }
}
