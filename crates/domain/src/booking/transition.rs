//! Status transitions allowed on an existing booking.

use booking_store::{BookingRecord, BookingStatus};

use crate::error::{BookingError, Result};

/// The owner's verdict on a waiting booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Status the booking moves to.
    pub fn target(&self) -> BookingStatus {
        match self {
            Decision::Approve => BookingStatus::Approved,
            Decision::Reject => BookingStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

impl From<bool> for Decision {
    fn from(approved: bool) -> Self {
        if approved {
            Decision::Approve
        } else {
            Decision::Reject
        }
    }
}

/// Returns the status a decision moves `record` to.
///
/// Re-deciding an already decided booking is an error, not a no-op.
pub(crate) fn decide(record: &BookingRecord, decision: Decision) -> Result<BookingStatus> {
    if !record.status.can_decide() {
        return Err(BookingError::InvalidStateTransition {
            booking_id: record.id,
            current: record.status,
            action: decision.as_str(),
        });
    }
    Ok(decision.target())
}

/// Returns the status a cancellation moves `record` to.
pub(crate) fn cancel(record: &BookingRecord) -> Result<BookingStatus> {
    if !record.status.can_cancel() {
        return Err(BookingError::InvalidStateTransition {
            booking_id: record.id,
            current: record.status,
            action: "cancel",
        });
    }
    Ok(BookingStatus::Canceled)
}

#[cfg(test)]
mod tests {
    use booking_store::{ItemId, NewBooking, UserId};
    use chrono::{Duration, Utc};

    use super::*;

    fn record_in(status: BookingStatus) -> BookingRecord {
        let start = Utc::now();
        BookingRecord {
            status,
            ..NewBooking::new(ItemId::new(), UserId::new(), start, start + Duration::days(1))
                .into_record()
        }
    }

    #[test]
    fn decision_from_flag() {
        assert_eq!(Decision::from(true).target(), BookingStatus::Approved);
        assert_eq!(Decision::from(false).target(), BookingStatus::Rejected);
    }

    #[test]
    fn waiting_booking_can_be_decided_either_way() {
        let record = record_in(BookingStatus::Waiting);
        assert_eq!(
            decide(&record, Decision::Approve).unwrap(),
            BookingStatus::Approved
        );
        assert_eq!(
            decide(&record, Decision::Reject).unwrap(),
            BookingStatus::Rejected
        );
    }

    #[test]
    fn decided_bookings_refuse_a_second_decision() {
        for status in [
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Canceled,
        ] {
            let result = decide(&record_in(status), Decision::Approve);
            assert!(matches!(
                result,
                Err(BookingError::InvalidStateTransition { current, .. }) if current == status
            ));
        }
    }

    #[test]
    fn cancel_from_waiting_or_approved_only() {
        assert_eq!(
            cancel(&record_in(BookingStatus::Waiting)).unwrap(),
            BookingStatus::Canceled
        );
        assert_eq!(
            cancel(&record_in(BookingStatus::Approved)).unwrap(),
            BookingStatus::Canceled
        );
        assert!(cancel(&record_in(BookingStatus::Rejected)).is_err());
        assert!(cancel(&record_in(BookingStatus::Canceled)).is_err());
    }
}
