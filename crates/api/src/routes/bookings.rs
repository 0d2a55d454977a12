//! Booking lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use booking_store::{
    BookingRecord, BookingRepository, BookingStatus, IdentityStore, Item, ItemStore, User,
};
use chrono::{DateTime, Utc};
use common::{BookingId, ItemId, UserId};
use domain::{Booking, BookingEngine, BookingRequest, ItemSchedule};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ActingUser;

/// The engine as wired by the server, over type-erased stores.
pub type Engine =
    BookingEngine<Arc<dyn BookingRepository>, Arc<dyn IdentityStore>, Arc<dyn ItemStore>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub engine: Engine,
}

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: Option<ItemId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(req: CreateBookingRequest) -> Self {
        BookingRequest {
            item_id: req.item_id,
            start: req.start,
            end: req.end,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApprovalParams {
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_state")]
    pub state: String,
}

fn default_state() -> String {
    "ALL".to_string()
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub item: ItemResponse,
    pub booker: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingShortResponse {
    pub id: BookingId,
    pub booker_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub last_booking: Option<BookingShortResponse>,
    pub next_booking: Option<BookingShortResponse>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
            item: booking.item.into(),
            booker: booking.booker.into(),
        }
    }
}

impl From<BookingRecord> for BookingShortResponse {
    fn from(record: BookingRecord) -> Self {
        Self {
            id: record.id,
            booker_id: record.booker_id,
            start: record.start,
            end: record.end,
            status: record.status,
        }
    }
}

impl From<ItemSchedule> for ScheduleResponse {
    fn from(schedule: ItemSchedule) -> Self {
        Self {
            last_booking: schedule.last.map(Into::into),
            next_booking: schedule.next.map(Into::into),
        }
    }
}

// -- Handlers --

/// POST /bookings — request a booking of an item.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let booking = state.engine.create(user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// PATCH /bookings/{id}?approved= — approve or reject a waiting booking.
#[tracing::instrument(skip(state, params))]
pub async fn set_approval(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<String>,
    params: Result<Query<ApprovalParams>, QueryRejection>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = parse_id::<BookingId>(&id, "booking id")?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let booking = state
        .engine
        .set_approval(booking_id, user_id, params.approved)
        .await?;
    Ok(Json(booking.into()))
}

/// POST /bookings/{id}/cancel — cancel one of the caller's bookings.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = parse_id::<BookingId>(&id, "booking id")?;
    let booking = state.engine.cancel(booking_id, user_id).await?;
    Ok(Json(booking.into()))
}

/// GET /bookings/{id} — fetch a booking as its booker or item owner.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = parse_id::<BookingId>(&id, "booking id")?;
    let booking = state.engine.get(booking_id, user_id).await?;
    Ok(Json(booking.into()))
}

/// GET /bookings?state= — list the caller's own bookings.
#[tracing::instrument(skip(state, params))]
pub async fn list_for_booker(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let bookings = state
        .engine
        .list_for_booker(user_id, &params.state)
        .await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /bookings/owner?state= — list bookings of the caller's items.
#[tracing::instrument(skip(state, params))]
pub async fn list_for_owner(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let bookings = state
        .engine
        .list_for_owner(user_id, &params.state)
        .await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /items/{id}/schedule — last and next bookings, for the owner.
#[tracing::instrument(skip(state))]
pub async fn item_schedule(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let item_id = parse_id::<ItemId>(&id, "item id")?;
    let schedule = state.engine.item_schedule(item_id, user_id).await?;
    Ok(Json(schedule.into()))
}

/// GET /items/{id}/comment-eligibility — whether the caller may comment.
#[tracing::instrument(skip(state))]
pub async fn comment_eligibility(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<String>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let item_id = parse_id::<ItemId>(&id, "item id")?;
    let eligible = state
        .engine
        .is_eligible_for_comment(user_id, item_id)
        .await?;
    Ok(Json(EligibilityResponse { eligible }))
}

fn parse_id<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = uuid::Error>,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {what}: {e}")))
}
