use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/summary
#[derive(Serialize)]
pub struct SummaryResponse {
    days: usize,
    bookings: usize,
    version: u64,
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SummaryResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let snapshot = state.store.load_all()?;
    Ok(Json(SummaryResponse {
        days: snapshot.ledger.day_count(),
        bookings: snapshot.ledger.total_bookings(),
        version: snapshot.version,
    }))
}

// DELETE /api/admin/bookings
pub async fn clear_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    state.store.clear_all()?;
    tracing::warn!("all bookings cleared by admin");

    Ok(Json(serde_json::json!({"cleared": true})))
}
