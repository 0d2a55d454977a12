//! Booking lifecycle engine.
//!
//! This crate validates and creates booking requests, runs the owner
//! approval state machine, and answers role-scoped, time-partitioned
//! queries over a user's bookings. Storage is reached through the ports in
//! `booking-store`.

pub mod booking;
pub mod clock;
pub mod error;

pub use booking::{
    Booking, BookingEngine, BookingRequest, Decision, ItemSchedule, Role, SearchMode,
    ValidatedRequest,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{BookingError, EntityKind, ErrorKind, Result};
