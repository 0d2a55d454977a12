//! Authorization rules tying bookings to items, owners and bookers.
//!
//! Callers run these only after the entities involved are known to exist.

use booking_store::{BookingRecord, Item, UserId};

use crate::error::{BookingError, Result};

/// Returns true if `user_id` booked the booking or owns its item.
pub fn is_participant(record: &BookingRecord, item: &Item, user_id: UserId) -> bool {
    record.booker_id == user_id || item.is_owned_by(user_id)
}

/// Only the item's owner may act. The booker gets `Forbidden` like anyone else.
pub fn ensure_item_owner(
    record: &BookingRecord,
    item: &Item,
    user_id: UserId,
    action: &'static str,
) -> Result<()> {
    if item.is_owned_by(user_id) {
        Ok(())
    } else {
        Err(BookingError::Forbidden {
            user_id,
            booking_id: record.id,
            action,
        })
    }
}

/// Only the booker may act.
pub fn ensure_booker(record: &BookingRecord, user_id: UserId, action: &'static str) -> Result<()> {
    if record.booker_id == user_id {
        Ok(())
    } else {
        Err(BookingError::Forbidden {
            user_id,
            booking_id: record.id,
            action,
        })
    }
}

/// Outsiders see `NotFound` so the booking's existence is not confirmed.
pub fn ensure_participant(record: &BookingRecord, item: &Item, user_id: UserId) -> Result<()> {
    if is_participant(record, item, user_id) {
        Ok(())
    } else {
        Err(BookingError::booking_not_found(record.id))
    }
}

/// Owners cannot book their own items.
pub fn ensure_not_owner(item: &Item, user_id: UserId) -> Result<()> {
    if item.is_owned_by(user_id) {
        Err(BookingError::SelfBookingForbidden(item.id))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use booking_store::NewBooking;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::error::ErrorKind;

    struct Parties {
        owner: UserId,
        booker: UserId,
        stranger: UserId,
        item: Item,
        record: BookingRecord,
    }

    fn parties() -> Parties {
        let owner = UserId::new();
        let booker = UserId::new();
        let item = Item::new(owner, "Tent");
        let start = Utc::now();
        let record = NewBooking::new(item.id, booker, start, start + Duration::days(2)).into_record();
        Parties {
            owner,
            booker,
            stranger: UserId::new(),
            item,
            record,
        }
    }

    #[test]
    fn participants_are_booker_and_owner() {
        let p = parties();
        assert!(is_participant(&p.record, &p.item, p.owner));
        assert!(is_participant(&p.record, &p.item, p.booker));
        assert!(!is_participant(&p.record, &p.item, p.stranger));
    }

    #[test]
    fn only_owner_passes_owner_check() {
        let p = parties();
        assert!(ensure_item_owner(&p.record, &p.item, p.owner, "approve").is_ok());
        for user in [p.booker, p.stranger] {
            let err = ensure_item_owner(&p.record, &p.item, user, "approve").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Forbidden);
        }
    }

    #[test]
    fn only_booker_passes_booker_check() {
        let p = parties();
        assert!(ensure_booker(&p.record, p.booker, "cancel").is_ok());
        assert_eq!(
            ensure_booker(&p.record, p.owner, "cancel").unwrap_err().kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn outsiders_get_not_found() {
        let p = parties();
        let err = ensure_participant(&p.record, &p.item, p.stranger).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn owner_cannot_book_own_item() {
        let p = parties();
        assert!(matches!(
            ensure_not_owner(&p.item, p.owner),
            Err(BookingError::SelfBookingForbidden(id)) if id == p.item.id
        ));
        assert!(ensure_not_owner(&p.item, p.booker).is_ok());
    }
}
