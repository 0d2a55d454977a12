//! Shared types for the booking system.

pub mod status;
pub mod types;

pub use status::{BookingStatus, UnknownStatus};
pub use types::{BookingId, ItemId, UserId};
