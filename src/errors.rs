use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::BookingError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Booking(BookingError::InvalidConfiguration(_)) => StatusCode::BAD_REQUEST,
            AppError::Booking(BookingError::SlotTaken { .. }) => StatusCode::CONFLICT,
            AppError::Booking(BookingError::StorageCorrupt(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Booking(BookingError::PersistenceFailed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(StoreError::Corrupt { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = match &self {
            AppError::Booking(BookingError::SlotTaken { conflict }) => serde_json::json!({
                "error": self.to_string(),
                "conflict": conflict,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
