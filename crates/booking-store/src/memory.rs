use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    BookingId, BookingQuery, BookingRecord, BookingStatus, CatalogFixtures, IdentityStore, Item,
    ItemId, ItemStore, NewBooking, Result, StoreError, User, UserId,
    store::BookingRepository,
};

/// In-memory booking repository.
///
/// Provides the same interface as the PostgreSQL implementation. Each
/// instance owns its own map, so tests get isolated state per fixture.
#[derive(Clone, Default)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<HashMap<BookingId, BookingRecord>>>,
}

impl InMemoryBookingRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of bookings stored.
    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Clears all bookings.
    pub async fn clear(&self) {
        self.bookings.write().await.clear();
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: NewBooking) -> Result<BookingRecord> {
        let record = booking.into_record();
        self.bookings
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: BookingId) -> Result<Option<BookingRecord>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn query(&self, query: BookingQuery) -> Result<Vec<BookingRecord>> {
        if query.is_empty_scope() {
            return Ok(Vec::new());
        }

        let store = self.bookings.read().await;
        let mut records: Vec<_> = store
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        drop(store);

        query.sort(&mut records);
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn transition_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<BookingRecord> {
        // Check and write under a single write guard.
        let mut store = self.bookings.write().await;
        let record = store.get_mut(&id).ok_or(StoreError::BookingNotFound(id))?;

        if record.status != expected {
            return Err(StoreError::StatusConflict {
                booking_id: id,
                expected,
                actual: record.status,
            });
        }

        record.status = next;
        Ok(record.clone())
    }
}

/// In-memory users and items.
///
/// Stands in for the external user and item subsystems in tests and in
/// database-less runs of the API server.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with fixtures.
    pub async fn from_fixtures(fixtures: CatalogFixtures) -> Self {
        let catalog = Self::new();
        catalog.load_fixtures(fixtures).await;
        catalog
    }

    /// Adds or replaces every user and item in the fixtures.
    pub async fn load_fixtures(&self, fixtures: CatalogFixtures) {
        let mut users = self.users.write().await;
        users.extend(fixtures.users.into_iter().map(|u| (u.id, u)));
        drop(users);

        let mut items = self.items.write().await;
        items.extend(fixtures.items.into_iter().map(|i| (i.id, i)));
    }

    /// Adds or replaces a user.
    pub async fn add_user(&self, user: User) -> UserId {
        let id = user.id;
        self.users.write().await.insert(id, user);
        id
    }

    /// Adds or replaces an item.
    pub async fn add_item(&self, item: Item) -> ItemId {
        let id = item.id;
        self.items.write().await.insert(id, item);
        id
    }

    /// Flips an item's availability flag. Returns false if the item is unknown.
    pub async fn set_available(&self, item_id: ItemId, available: bool) -> bool {
        match self.items.write().await.get_mut(&item_id) {
            Some(item) => {
                item.available = available;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityStore for InMemoryCatalog {
    async fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.users.read().await.contains_key(&id))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl ItemStore for InMemoryCatalog {
    async fn item_exists(&self, id: ItemId) -> Result<bool> {
        Ok(self.items.read().await.contains_key(&id))
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        let mut owned: Vec<_> = items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|item| item.id);
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::{BookingRepositoryExt, SortOrder, to_stored_precision};

    fn new_booking(item_id: ItemId, booker_id: UserId, start: DateTime<Utc>) -> NewBooking {
        NewBooking::new(item_id, booker_id, start, start + Duration::days(1))
    }

    #[tokio::test]
    async fn insert_assigns_id_and_waiting_status() {
        let repo = InMemoryBookingRepository::new();
        let record = repo
            .insert(new_booking(ItemId::new(), UserId::new(), Utc::now()))
            .await
            .unwrap();

        assert_eq!(record.status, BookingStatus::Waiting);
        assert_eq!(repo.get(record.id).await.unwrap(), Some(record.clone()));
        assert!(repo.exists(record.id).await.unwrap());
        assert_eq!(repo.booking_count().await, 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = InMemoryBookingRepository::new();
        assert!(repo.get(BookingId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transition_succeeds_from_expected_status() {
        let repo = InMemoryBookingRepository::new();
        let record = repo
            .insert(new_booking(ItemId::new(), UserId::new(), Utc::now()))
            .await
            .unwrap();

        let updated = repo
            .transition_status(record.id, BookingStatus::Waiting, BookingStatus::Approved)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Approved);
        assert_eq!(
            repo.get(record.id).await.unwrap().unwrap().status,
            BookingStatus::Approved
        );
    }

    #[tokio::test]
    async fn transition_conflict_leaves_row_untouched() {
        let repo = InMemoryBookingRepository::new();
        let record = repo
            .insert(new_booking(ItemId::new(), UserId::new(), Utc::now()))
            .await
            .unwrap();
        repo.transition_status(record.id, BookingStatus::Waiting, BookingStatus::Rejected)
            .await
            .unwrap();

        let result = repo
            .transition_status(record.id, BookingStatus::Waiting, BookingStatus::Approved)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::StatusConflict {
                actual: BookingStatus::Rejected,
                ..
            })
        ));
        assert_eq!(
            repo.get(record.id).await.unwrap().unwrap().status,
            BookingStatus::Rejected
        );
    }

    #[tokio::test]
    async fn transition_missing_booking() {
        let repo = InMemoryBookingRepository::new();
        let result = repo
            .transition_status(BookingId::new(), BookingStatus::Waiting, BookingStatus::Approved)
            .await;
        assert!(matches!(result, Err(StoreError::BookingNotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_transitions_have_one_winner() {
        let repo = InMemoryBookingRepository::new();
        let record = repo
            .insert(new_booking(ItemId::new(), UserId::new(), Utc::now()))
            .await
            .unwrap();

        let approve = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.transition_status(record.id, BookingStatus::Waiting, BookingStatus::Approved)
                    .await
            })
        };
        let reject = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.transition_status(record.id, BookingStatus::Waiting, BookingStatus::Rejected)
                    .await
            })
        };

        let results = [approve.await.unwrap(), reject.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(StoreError::StatusConflict { .. })))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn query_filters_sorts_and_limits() {
        let repo = InMemoryBookingRepository::new();
        let booker = UserId::new();
        let item = ItemId::new();
        let now = to_stored_precision(Utc::now());

        for days in [3, -10, 7] {
            repo.insert(new_booking(item, booker, now + Duration::days(days)))
                .await
                .unwrap();
        }
        repo.insert(new_booking(item, UserId::new(), now))
            .await
            .unwrap();

        let mine = repo.query(BookingQuery::for_booker(booker)).await.unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.windows(2).all(|w| w[0].start >= w[1].start));

        let upcoming = repo
            .query(
                BookingQuery::for_booker(booker)
                    .start_after(now)
                    .order(SortOrder::StartAsc),
            )
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].start, now + Duration::days(3));

        let first = repo
            .first(BookingQuery::for_items(vec![item]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.start, now + Duration::days(7));
    }

    #[tokio::test]
    async fn query_with_empty_item_scope_is_empty() {
        let repo = InMemoryBookingRepository::new();
        repo.insert(new_booking(ItemId::new(), UserId::new(), Utc::now()))
            .await
            .unwrap();

        let result = repo.query(BookingQuery::for_items(vec![])).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn catalog_lookups() {
        let catalog = InMemoryCatalog::new();
        let owner = catalog
            .add_user(User::new("Alice", "alice@example.com"))
            .await;
        let drill = catalog.add_item(Item::new(owner, "Drill")).await;
        catalog.add_item(Item::new(UserId::new(), "Saw")).await;

        assert!(catalog.user_exists(owner).await.unwrap());
        assert!(!catalog.user_exists(UserId::new()).await.unwrap());
        assert!(catalog.item_exists(drill).await.unwrap());

        let owned = catalog.list_by_owner(owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, drill);

        assert!(catalog.set_available(drill, false).await);
        assert!(!catalog.get_item(drill).await.unwrap().unwrap().available);
        assert!(!catalog.set_available(ItemId::new(), false).await);
    }

    #[tokio::test]
    async fn catalog_loads_fixtures() {
        let owner = User::new("Alice", "alice@example.com");
        let item = Item::new(owner.id, "Drill");
        let catalog = InMemoryCatalog::from_fixtures(CatalogFixtures {
            users: vec![owner.clone()],
            items: vec![item.clone()],
        })
        .await;

        assert_eq!(catalog.get_user(owner.id).await.unwrap(), Some(owner));
        assert_eq!(catalog.get_item(item.id).await.unwrap(), Some(item));
    }
}
