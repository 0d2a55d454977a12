//! The booking engine.

use std::collections::HashMap;
use std::sync::Arc;

use booking_store::{
    BookingId, BookingQuery, BookingRecord, BookingRepository, BookingRepositoryExt,
    BookingStatus, IdentityStore, Item, ItemId, ItemStore, NewBooking, SortOrder, StoreError,
    User, UserId,
};

use crate::clock::{Clock, SystemClock};
use crate::error::{BookingError, Result};

use super::{
    Booking, BookingRequest, Decision, ItemSchedule, Role, SearchMode, access, transition,
};

fn record_error(err: &BookingError) {
    metrics::counter!("booking_errors_total", "kind" => err.kind().as_str()).increment(1);
}

/// Validates and creates bookings, runs the approval state machine, and
/// answers role-scoped, time-partitioned queries.
///
/// Users and items are read through the identity and item stores; bookings
/// are written only through the repository. Every operation reads "now" at
/// most once.
pub struct BookingEngine<R, U, I> {
    bookings: R,
    users: U,
    items: I,
    clock: Arc<dyn Clock>,
}

impl<R, U, I> BookingEngine<R, U, I>
where
    R: BookingRepository,
    U: IdentityStore,
    I: ItemStore,
{
    /// Creates an engine over the given stores, using the system clock.
    pub fn new(bookings: R, users: U, items: I) -> Self {
        Self {
            bookings,
            users,
            items,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns a reference to the underlying booking repository.
    pub fn repository(&self) -> &R {
        &self.bookings
    }

    /// Creates a booking in `WAITING` status.
    ///
    /// Checks run in order: request shape, requester, item, availability,
    /// ownership. Item availability is read, never changed.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, requester_id: UserId, request: BookingRequest) -> Result<Booking> {
        self.create_booking(requester_id, request)
            .await
            .inspect_err(record_error)
    }

    async fn create_booking(&self, requester_id: UserId, request: BookingRequest) -> Result<Booking> {
        let request = request.validate()?;
        let booker = self.load_user(requester_id).await?;
        let item = self.load_item(request.item_id).await?;

        if !item.available {
            return Err(BookingError::ItemUnavailable(item.id));
        }
        access::ensure_not_owner(&item, requester_id)?;

        let record = self
            .bookings
            .insert(NewBooking::new(
                item.id,
                booker.id,
                request.start,
                request.end,
            ))
            .await?;

        metrics::counter!("bookings_created_total").increment(1);
        tracing::info!(booking_id = %record.id, item_id = %item.id, "booking created");

        Ok(Booking::from_parts(record, item, booker))
    }

    /// Approves or rejects a waiting booking. Only the item's owner may decide.
    #[tracing::instrument(skip(self))]
    pub async fn set_approval(
        &self,
        booking_id: BookingId,
        acting_user_id: UserId,
        approve: bool,
    ) -> Result<Booking> {
        self.decide(booking_id, acting_user_id, Decision::from(approve))
            .await
            .inspect_err(record_error)
    }

    async fn decide(
        &self,
        booking_id: BookingId,
        acting_user_id: UserId,
        decision: Decision,
    ) -> Result<Booking> {
        let record = self.load_booking(booking_id).await?;
        let item = self.load_item(record.item_id).await?;
        access::ensure_item_owner(&record, &item, acting_user_id, decision.as_str())?;

        let next = transition::decide(&record, decision)?;
        let updated = self
            .commit_transition(&record, next, decision.as_str())
            .await?;

        metrics::counter!("booking_decisions_total", "decision" => decision.as_str())
            .increment(1);
        tracing::info!(%booking_id, status = %updated.status, "booking decided");

        let booker = self.load_user(updated.booker_id).await?;
        Ok(Booking::from_parts(updated, item, booker))
    }

    /// Cancels a waiting or approved booking. Only the booker may cancel.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, booking_id: BookingId, acting_user_id: UserId) -> Result<Booking> {
        self.cancel_booking(booking_id, acting_user_id)
            .await
            .inspect_err(record_error)
    }

    async fn cancel_booking(&self, booking_id: BookingId, acting_user_id: UserId) -> Result<Booking> {
        let record = self.load_booking(booking_id).await?;
        access::ensure_booker(&record, acting_user_id, "cancel")?;

        let next = transition::cancel(&record)?;
        let updated = self.commit_transition(&record, next, "cancel").await?;

        metrics::counter!("bookings_cancelled_total").increment(1);
        tracing::info!(%booking_id, "booking cancelled");

        self.hydrate(updated).await
    }

    /// Returns a booking to its booker or to the item's owner.
    ///
    /// Anyone else gets `NotFound`, as if the booking did not exist.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, booking_id: BookingId, requester_id: UserId) -> Result<Booking> {
        self.get_booking(booking_id, requester_id)
            .await
            .inspect_err(record_error)
    }

    async fn get_booking(&self, booking_id: BookingId, requester_id: UserId) -> Result<Booking> {
        let record = self.load_booking(booking_id).await?;
        let item = self.load_item(record.item_id).await?;
        access::ensure_participant(&record, &item, requester_id)?;

        let booker = self.load_user(record.booker_id).await?;
        Ok(Booking::from_parts(record, item, booker))
    }

    /// Lists the user's own bookings in the named partition, latest start first.
    pub async fn list_for_booker(&self, user_id: UserId, mode: &str) -> Result<Vec<Booking>> {
        self.list_by_name(Role::Booker, user_id, mode).await
    }

    /// Lists bookings of the user's items in the named partition, latest
    /// start first.
    pub async fn list_for_owner(&self, user_id: UserId, mode: &str) -> Result<Vec<Booking>> {
        self.list_by_name(Role::Owner, user_id, mode).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_name(&self, role: Role, user_id: UserId, mode: &str) -> Result<Vec<Booking>> {
        self.list_named(role, user_id, mode)
            .await
            .inspect_err(record_error)
    }

    async fn list_named(&self, role: Role, user_id: UserId, mode: &str) -> Result<Vec<Booking>> {
        self.ensure_user_exists(user_id).await?;
        let mode: SearchMode = mode.parse()?;
        self.search(role, user_id, mode).await
    }

    /// Lists bookings for a role and an already parsed partition.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, role: Role, user_id: UserId, mode: SearchMode) -> Result<Vec<Booking>> {
        self.list_typed(role, user_id, mode)
            .await
            .inspect_err(record_error)
    }

    async fn list_typed(&self, role: Role, user_id: UserId, mode: SearchMode) -> Result<Vec<Booking>> {
        self.ensure_user_exists(user_id).await?;
        self.search(role, user_id, mode).await
    }

    async fn search(&self, role: Role, user_id: UserId, mode: SearchMode) -> Result<Vec<Booking>> {
        metrics::counter!(
            "booking_queries_total",
            "role" => role.as_str(),
            "mode" => mode.as_str()
        )
        .increment(1);

        let (scope, known_items) = match role {
            Role::Booker => (BookingQuery::for_booker(user_id), HashMap::new()),
            Role::Owner => {
                let owned = self.items.list_by_owner(user_id).await?;
                let ids = owned.iter().map(|item| item.id).collect();
                let known = owned.into_iter().map(|item| (item.id, item)).collect();
                (BookingQuery::for_items(ids), known)
            }
        };

        let now = self.clock.now();
        let query = mode.apply(scope.order(SortOrder::StartDesc), now);
        let records = self.bookings.query(query).await?;

        tracing::debug!(count = records.len(), "bookings listed");
        self.hydrate_all(records, known_items).await
    }

    /// Returns true if the user may comment on the item: they have a booking
    /// of it that has ended and was neither rejected nor cancelled, and they
    /// do not own it.
    #[tracing::instrument(skip(self))]
    pub async fn is_eligible_for_comment(&self, user_id: UserId, item_id: ItemId) -> Result<bool> {
        self.check_comment_eligibility(user_id, item_id)
            .await
            .inspect_err(record_error)
    }

    async fn check_comment_eligibility(&self, user_id: UserId, item_id: ItemId) -> Result<bool> {
        let Some(item) = self.items.get_item(item_id).await? else {
            return Ok(false);
        };
        if item.is_owned_by(user_id) {
            return Ok(false);
        }

        let now = self.clock.now();
        let completed = self
            .bookings
            .first(
                BookingQuery::for_booker(user_id)
                    .item_id(item_id)
                    .end_before(now)
                    .exclude_status(BookingStatus::Rejected)
                    .exclude_status(BookingStatus::Canceled),
            )
            .await?;
        Ok(completed.is_some())
    }

    /// Returns the item's last and next non-rejected bookings.
    ///
    /// Only the owner sees them; for anyone else both are empty.
    #[tracing::instrument(skip(self))]
    pub async fn item_schedule(&self, item_id: ItemId, requester_id: UserId) -> Result<ItemSchedule> {
        self.schedule_for(item_id, requester_id)
            .await
            .inspect_err(record_error)
    }

    async fn schedule_for(&self, item_id: ItemId, requester_id: UserId) -> Result<ItemSchedule> {
        let item = self.load_item(item_id).await?;
        if !item.is_owned_by(requester_id) {
            return Ok(ItemSchedule::default());
        }

        let now = self.clock.now();
        let relevant = BookingQuery::new()
            .item_id(item_id)
            .exclude_status(BookingStatus::Rejected);

        let last = self
            .bookings
            .first(
                relevant
                    .clone()
                    .start_at_or_before(now)
                    .order(SortOrder::StartDesc),
            )
            .await?;
        let next = self
            .bookings
            .first(relevant.start_after(now).order(SortOrder::StartAsc))
            .await?;

        Ok(ItemSchedule { last, next })
    }

    async fn commit_transition(
        &self,
        record: &BookingRecord,
        next: BookingStatus,
        action: &'static str,
    ) -> Result<BookingRecord> {
        match self
            .bookings
            .transition_status(record.id, record.status, next)
            .await
        {
            Ok(updated) => Ok(updated),
            Err(StoreError::StatusConflict { actual, .. }) => {
                tracing::warn!(booking_id = %record.id, %actual, action, "lost transition race");
                Err(BookingError::InvalidStateTransition {
                    booking_id: record.id,
                    current: actual,
                    action,
                })
            }
            Err(StoreError::BookingNotFound(id)) => Err(BookingError::booking_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> Result<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(BookingError::user_not_found(user_id))
        }
    }

    async fn load_user(&self, user_id: UserId) -> Result<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| BookingError::user_not_found(user_id))
    }

    async fn load_item(&self, item_id: ItemId) -> Result<Item> {
        self.items
            .get_item(item_id)
            .await?
            .ok_or_else(|| BookingError::item_not_found(item_id))
    }

    async fn load_booking(&self, booking_id: BookingId) -> Result<BookingRecord> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::booking_not_found(booking_id))
    }

    async fn hydrate(&self, record: BookingRecord) -> Result<Booking> {
        let item = self.load_item(record.item_id).await?;
        let booker = self.load_user(record.booker_id).await?;
        Ok(Booking::from_parts(record, item, booker))
    }

    /// Resolves each distinct item and booker once.
    async fn hydrate_all(
        &self,
        records: Vec<BookingRecord>,
        mut items: HashMap<ItemId, Item>,
    ) -> Result<Vec<Booking>> {
        let mut users: HashMap<UserId, User> = HashMap::new();
        let mut bookings = Vec::with_capacity(records.len());

        for record in records {
            let item = match items.get(&record.item_id) {
                Some(item) => item.clone(),
                None => {
                    let item = self.load_item(record.item_id).await?;
                    items.insert(item.id, item.clone());
                    item
                }
            };
            let booker = match users.get(&record.booker_id) {
                Some(user) => user.clone(),
                None => {
                    let user = self.load_user(record.booker_id).await?;
                    users.insert(user.id, user.clone());
                    user
                }
            };
            bookings.push(Booking::from_parts(record, item, booker));
        }

        Ok(bookings)
    }
}
