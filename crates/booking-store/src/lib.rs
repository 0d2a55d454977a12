//! Storage ports for the booking engine.
//!
//! The [`BookingRepository`] owns booking rows. [`IdentityStore`] and
//! [`ItemStore`] give read-only access to users and items, which belong to
//! other subsystems. Each port has an in-memory adapter for tests and local
//! runs, and a PostgreSQL adapter.

pub mod catalog;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use catalog::{CatalogFixtures, IdentityStore, Item, ItemStore, User};
pub use common::{BookingId, BookingStatus, ItemId, UserId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryBookingRepository, InMemoryCatalog};
pub use postgres::{PostgresBookingRepository, PostgresCatalog};
pub use query::{BookingQuery, SortOrder};
pub use record::{BookingRecord, NewBooking, to_stored_precision};
pub use store::{BookingRepository, BookingRepositoryExt};
