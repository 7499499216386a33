use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Slot;
use crate::state::AppState;

const DEFAULT_DURATION_MINUTES: i64 = 60;

// GET /api/slots?date=2024-06-10&duration=60
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub duration: Option<i64>,
}

pub(crate) fn parse_day(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date: {raw}")))
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let day = parse_day(&query.date)?;
    let duration = query.duration.unwrap_or(DEFAULT_DURATION_MINUTES);

    let slots = state.bookings.list_slots(day, duration)?;
    tracing::debug!(day = %day, duration, count = slots.len(), "listed slots");

    Ok(Json(slots))
}
