use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::slots::parse_day;
use crate::errors::AppError;
use crate::models::{Booking, Interval};
use crate::state::AppState;

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub date: String,
    pub interval: Interval,
    #[serde(default)]
    pub name: String,
    pub note: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let day = parse_day(&payload.date)?;

    let booking = state.bookings.create_booking(
        payload.interval,
        day,
        &payload.name,
        payload.note.as_deref(),
    )?;

    Ok((StatusCode::CREATED, Json(booking)))
}
