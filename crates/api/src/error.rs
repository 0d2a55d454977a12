//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{BookingError, ErrorKind};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request from the client, caught before reaching the engine.
    #[error("{0}")]
    BadRequest(String),
    /// Error reported by the booking engine.
    #[error(transparent)]
    Booking(#[from] BookingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Booking(err) => booking_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Maps an engine error kind to its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MalformedRequest
        | ErrorKind::InvalidSearchMode
        | ErrorKind::ItemUnavailable
        | ErrorKind::SelfBookingForbidden => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn booking_error_to_response(err: BookingError) -> (StatusCode, String) {
    let status = status_for(err.kind());
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "internal server error");
    }
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use booking_store::{BookingId, ItemId, StoreError};

    use super::*;

    #[test]
    fn test_client_errors() {
        assert_eq!(status_for(ErrorKind::MalformedRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidSearchMode), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(ErrorKind::InvalidStateTransition),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_booking_error_response() {
        let response =
            ApiError::from(BookingError::SelfBookingForbidden(ItemId::new())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::from(BookingError::from(StoreError::BookingNotFound(BookingId::new())))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
