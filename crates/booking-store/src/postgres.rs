use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    BookingId, BookingQuery, BookingRecord, BookingStatus, IdentityStore, Item, ItemId, ItemStore,
    NewBooking, Result, SortOrder, StoreError, User, UserId, store::BookingRepository,
};

const BOOKING_COLUMNS: &str = "id, start_at, end_at, item_id, booker_id, status";

/// PostgreSQL-backed booking repository.
#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    /// Creates a new PostgreSQL booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("booking migrations applied");
        Ok(())
    }

    fn row_to_booking(row: PgRow) -> Result<BookingRecord> {
        let status: String = row.try_get("status")?;

        Ok(BookingRecord {
            id: BookingId::from_uuid(row.try_get::<Uuid, _>("id")?),
            start: row.try_get("start_at")?,
            end: row.try_get("end_at")?,
            item_id: ItemId::from_uuid(row.try_get::<Uuid, _>("item_id")?),
            booker_id: UserId::from_uuid(row.try_get::<Uuid, _>("booker_id")?),
            status: status.parse()?,
        })
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert(&self, booking: NewBooking) -> Result<BookingRecord> {
        let record = booking.into_record();

        // Return the stored row so callers see the column precision.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (id, start_at, end_at, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(record.id.as_uuid())
        .bind(record.start)
        .bind(record.end)
        .bind(record.item_id.as_uuid())
        .bind(record.booker_id.as_uuid())
        .bind(record.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_booking(row)
    }

    async fn get(&self, id: BookingId) -> Result<Option<BookingRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_booking).transpose()
    }

    async fn query(&self, query: BookingQuery) -> Result<Vec<BookingRecord>> {
        if query.is_empty_scope() {
            return Ok(Vec::new());
        }

        let mut sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.booker_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND booker_id = ${param_count}"));
        }
        if query.item_ids.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND item_id = ANY(${param_count})"));
        }
        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if !query.excluded_statuses.is_empty() {
            param_count += 1;
            sql.push_str(&format!(" AND status <> ALL(${param_count})"));
        }
        if query.start_at_or_before.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND start_at <= ${param_count}"));
        }
        if query.start_after.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND start_at > ${param_count}"));
        }
        if query.end_before.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND end_at < ${param_count}"));
        }
        if query.end_after.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND end_at > ${param_count}"));
        }

        match query.order {
            SortOrder::StartDesc => sql.push_str(" ORDER BY start_at DESC, id ASC"),
            SortOrder::StartAsc => sql.push_str(" ORDER BY start_at ASC, id ASC"),
        }

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        // Bind in the same order the placeholders were numbered
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(booker_id) = query.booker_id {
            sqlx_query = sqlx_query.bind(booker_id.as_uuid());
        }
        if let Some(item_ids) = query.item_ids {
            let ids: Vec<Uuid> = item_ids.into_iter().map(Uuid::from).collect();
            sqlx_query = sqlx_query.bind(ids);
        }
        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if !query.excluded_statuses.is_empty() {
            let excluded: Vec<&str> = query
                .excluded_statuses
                .iter()
                .map(BookingStatus::as_str)
                .collect();
            sqlx_query = sqlx_query.bind(excluded);
        }
        if let Some(t) = query.start_at_or_before {
            sqlx_query = sqlx_query.bind(t);
        }
        if let Some(t) = query.start_after {
            sqlx_query = sqlx_query.bind(t);
        }
        if let Some(t) = query.end_before {
            sqlx_query = sqlx_query.bind(t);
        }
        if let Some(t) = query.end_after {
            sqlx_query = sqlx_query.bind(t);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn transition_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<BookingRecord> {
        let mut tx = self.pool.begin().await?;

        // The status predicate makes a racing second writer match zero rows
        // once the first one has committed.
        let updated = sqlx::query(&format!(
            "UPDATE bookings SET status = $3 WHERE id = $1 AND status = $2 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(next.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = updated {
            let record = Self::row_to_booking(row)?;
            tx.commit().await?;
            return Ok(record);
        }

        let actual: Option<String> = sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;
        tx.rollback().await?;
        tracing::debug!(booking_id = %id, ?actual, %expected, "status compare-and-set missed");

        match actual {
            None => Err(StoreError::BookingNotFound(id)),
            Some(actual) => Err(StoreError::StatusConflict {
                booking_id: id,
                expected,
                actual: actual.parse()?,
            }),
        }
    }
}

/// Read-only view of the `users` and `items` tables.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_item(row: PgRow) -> Result<Item> {
        Ok(Item {
            id: ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            available: row.try_get("available")?,
            owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
        })
    }
}

#[async_trait]
impl IdentityStore for PostgresCatalog {
    async fn user_exists(&self, id: UserId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(User {
                id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ItemStore for PostgresCatalog {
    async fn item_exists(&self, id: ItemId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query(
            "SELECT id, name, description, available, owner_id FROM items WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id
            FROM items
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }
}
