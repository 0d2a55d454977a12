//! Domain error types.

use booking_store::{BookingId, BookingStatus, ItemId, StoreError, UserId};
use thiserror::Error;
use uuid::Uuid;

/// The kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Item,
    Booking,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Item => "Item",
            EntityKind::Booking => "Booking",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fieldless classification of [`BookingError`], for transport mapping and
/// metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedRequest,
    NotFound,
    Forbidden,
    ItemUnavailable,
    SelfBookingForbidden,
    InvalidStateTransition,
    InvalidSearchMode,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedRequest => "malformed_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::ItemUnavailable => "item_unavailable",
            ErrorKind::SelfBookingForbidden => "self_booking_forbidden",
            ErrorKind::InvalidStateTransition => "invalid_state_transition",
            ErrorKind::InvalidSearchMode => "invalid_search_mode",
            ErrorKind::Store => "store",
        }
    }
}

/// Errors that can occur during booking operations.
///
/// Every variant is terminal for the call.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Missing or inconsistent input.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// A referenced user, item or booking does not exist, or is not visible
    /// to the caller.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    /// The acting user lacks the role the operation requires.
    #[error("User {user_id} is not allowed to {action} booking {booking_id}")]
    Forbidden {
        user_id: UserId,
        booking_id: BookingId,
        action: &'static str,
    },

    /// The item is not currently offered for rent.
    #[error("Item {0} is not available for booking")]
    ItemUnavailable(ItemId),

    /// Owners cannot book their own items.
    #[error("Item {0} belongs to the requester and cannot be booked by them")]
    SelfBookingForbidden(ItemId),

    /// The booking's current status does not allow the requested action.
    #[error("Invalid state transition: cannot {action} booking {booking_id} in {current} status")]
    InvalidStateTransition {
        booking_id: BookingId,
        current: BookingStatus,
        action: &'static str,
    },

    /// The search mode string is not recognised.
    #[error("Unknown search mode: {0}")]
    InvalidSearchMode(String),

    /// An error occurred in a backing store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn user_not_found(id: UserId) -> Self {
        BookingError::NotFound {
            entity: EntityKind::User,
            id: id.as_uuid(),
        }
    }

    pub fn item_not_found(id: ItemId) -> Self {
        BookingError::NotFound {
            entity: EntityKind::Item,
            id: id.as_uuid(),
        }
    }

    pub fn booking_not_found(id: BookingId) -> Self {
        BookingError::NotFound {
            entity: EntityKind::Booking,
            id: id.as_uuid(),
        }
    }

    /// Returns the error's classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::MalformedRequest(_) => ErrorKind::MalformedRequest,
            BookingError::NotFound { .. } => ErrorKind::NotFound,
            BookingError::Forbidden { .. } => ErrorKind::Forbidden,
            BookingError::ItemUnavailable(_) => ErrorKind::ItemUnavailable,
            BookingError::SelfBookingForbidden(_) => ErrorKind::SelfBookingForbidden,
            BookingError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            BookingError::InvalidSearchMode(_) => ErrorKind::InvalidSearchMode,
            BookingError::Store(_) => ErrorKind::Store,
        }
    }
}

/// Result type for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        let id = ItemId::new();
        let err = BookingError::item_not_found(id);
        assert_eq!(err.to_string(), format!("Item not found: {id}"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn store_errors_are_classified_as_store() {
        let err: BookingError = StoreError::BookingNotFound(BookingId::new()).into();
        assert_eq!(err.kind(), ErrorKind::Store);
    }

    #[test]
    fn transition_message_includes_status() {
        let err = BookingError::InvalidStateTransition {
            booking_id: BookingId::new(),
            current: BookingStatus::Approved,
            action: "approve",
        };
        assert!(err.to_string().contains("APPROVED"));
        assert_eq!(err.kind().as_str(), "invalid_state_transition");
    }
}
