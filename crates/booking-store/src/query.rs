use chrono::{DateTime, Utc};

use crate::{BookingRecord, BookingStatus, ItemId, UserId};

/// Sort order for booking queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Latest start first.
    #[default]
    StartDesc,
    /// Earliest start first.
    StartAsc,
}

/// Builder for constructing booking queries.
///
/// All filters are optional and combined with AND. Results are ordered by
/// `start` (ties broken by id) and optionally truncated to `limit`.
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    /// Filter by booker.
    pub booker_id: Option<UserId>,

    /// Filter by item (any of these). An empty list matches nothing.
    pub item_ids: Option<Vec<ItemId>>,

    /// Filter by exact status.
    pub status: Option<BookingStatus>,

    /// Exclude bookings in any of these statuses.
    pub excluded_statuses: Vec<BookingStatus>,

    /// `start <= t`
    pub start_at_or_before: Option<DateTime<Utc>>,

    /// `start > t`
    pub start_after: Option<DateTime<Utc>>,

    /// `end < t`
    pub end_before: Option<DateTime<Utc>>,

    /// `end > t`
    pub end_after: Option<DateTime<Utc>>,

    pub order: SortOrder,

    /// Maximum number of bookings to return.
    pub limit: Option<usize>,
}

impl BookingQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for bookings made by a user.
    pub fn for_booker(booker_id: UserId) -> Self {
        Self {
            booker_id: Some(booker_id),
            ..Default::default()
        }
    }

    /// Creates a query for bookings of any of the given items.
    pub fn for_items(item_ids: Vec<ItemId>) -> Self {
        Self {
            item_ids: Some(item_ids),
            ..Default::default()
        }
    }

    /// Filters by booker.
    pub fn booker_id(mut self, booker_id: UserId) -> Self {
        self.booker_id = Some(booker_id);
        self
    }

    /// Filters to a single item.
    pub fn item_id(mut self, item_id: ItemId) -> Self {
        self.item_ids = Some(vec![item_id]);
        self
    }

    /// Filters by exact status.
    pub fn status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Excludes bookings in the given status.
    pub fn exclude_status(mut self, status: BookingStatus) -> Self {
        if !self.excluded_statuses.contains(&status) {
            self.excluded_statuses.push(status);
        }
        self
    }

    /// Keeps bookings that started at or before `t`.
    pub fn start_at_or_before(mut self, t: DateTime<Utc>) -> Self {
        self.start_at_or_before = Some(t);
        self
    }

    /// Keeps bookings that start strictly after `t`.
    pub fn start_after(mut self, t: DateTime<Utc>) -> Self {
        self.start_after = Some(t);
        self
    }

    /// Keeps bookings that ended strictly before `t`.
    pub fn end_before(mut self, t: DateTime<Utc>) -> Self {
        self.end_before = Some(t);
        self
    }

    /// Keeps bookings that end strictly after `t`.
    pub fn end_after(mut self, t: DateTime<Utc>) -> Self {
        self.end_after = Some(t);
        self
    }

    /// Sets the sort order.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Limits the number of bookings returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the query can only produce an empty result.
    pub fn is_empty_scope(&self) -> bool {
        matches!(&self.item_ids, Some(ids) if ids.is_empty()) || self.limit == Some(0)
    }

    /// Evaluates the filters against a single record.
    pub fn matches(&self, record: &BookingRecord) -> bool {
        if let Some(booker_id) = self.booker_id
            && record.booker_id != booker_id
        {
            return false;
        }
        if let Some(ref item_ids) = self.item_ids
            && !item_ids.contains(&record.item_id)
        {
            return false;
        }
        if let Some(status) = self.status
            && record.status != status
        {
            return false;
        }
        if self.excluded_statuses.contains(&record.status) {
            return false;
        }
        if let Some(t) = self.start_at_or_before
            && record.start > t
        {
            return false;
        }
        if let Some(t) = self.start_after
            && record.start <= t
        {
            return false;
        }
        if let Some(t) = self.end_before
            && record.end >= t
        {
            return false;
        }
        if let Some(t) = self.end_after
            && record.end <= t
        {
            return false;
        }
        true
    }

    /// Sorts records in place according to `order`.
    pub fn sort(&self, records: &mut [BookingRecord]) {
        match self.order {
            SortOrder::StartDesc => {
                records.sort_by(|a, b| b.start.cmp(&a.start).then(a.id.cmp(&b.id)))
            }
            SortOrder::StartAsc => {
                records.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::NewBooking;

    fn record(start_offset_days: i64, end_offset_days: i64, now: DateTime<Utc>) -> BookingRecord {
        NewBooking::new(
            ItemId::new(),
            UserId::new(),
            now + Duration::days(start_offset_days),
            now + Duration::days(end_offset_days),
        )
        .into_record()
    }

    #[test]
    fn query_for_booker() {
        let id = UserId::new();
        let query = BookingQuery::for_booker(id);

        assert_eq!(query.booker_id, Some(id));
        assert!(query.item_ids.is_none());
        assert_eq!(query.order, SortOrder::StartDesc);
    }

    #[test]
    fn query_builder_chain() {
        let now = Utc::now();
        let item = ItemId::new();
        let query = BookingQuery::new()
            .item_id(item)
            .status(BookingStatus::Waiting)
            .exclude_status(BookingStatus::Rejected)
            .exclude_status(BookingStatus::Rejected)
            .end_before(now)
            .order(SortOrder::StartAsc)
            .limit(1);

        assert_eq!(query.item_ids, Some(vec![item]));
        assert_eq!(query.status, Some(BookingStatus::Waiting));
        assert_eq!(query.excluded_statuses, vec![BookingStatus::Rejected]);
        assert_eq!(query.end_before, Some(now));
        assert_eq!(query.order, SortOrder::StartAsc);
        assert_eq!(query.limit, Some(1));
    }

    #[test]
    fn empty_item_scope_matches_nothing() {
        let now = Utc::now();
        let query = BookingQuery::for_items(vec![]);
        assert!(query.is_empty_scope());
        assert!(!query.matches(&record(-1, 1, now)));
    }

    #[test]
    fn time_bounds_are_applied_strictly() {
        let now = Utc::now();
        let current = record(-2, 2, now);
        let starts_now = BookingRecord {
            start: now,
            ..record(0, 1, now)
        };

        let in_progress = BookingQuery::new().start_at_or_before(now).end_after(now);
        assert!(in_progress.matches(&current));
        assert!(in_progress.matches(&starts_now));

        let upcoming = BookingQuery::new().start_after(now);
        assert!(!upcoming.matches(&starts_now));
        assert!(upcoming.matches(&record(1, 2, now)));

        let finished = BookingQuery::new().end_before(now);
        assert!(finished.matches(&record(-3, -1, now)));
        assert!(!finished.matches(&current));
    }

    #[test]
    fn sort_orders_by_start() {
        let now = Utc::now();
        let mut records = vec![record(1, 2, now), record(-5, -4, now), record(3, 4, now)];

        BookingQuery::new().sort(&mut records);
        assert!(records.windows(2).all(|w| w[0].start >= w[1].start));

        BookingQuery::new()
            .order(SortOrder::StartAsc)
            .sort(&mut records);
        assert!(records.windows(2).all(|w| w[0].start <= w[1].start));
    }
}
