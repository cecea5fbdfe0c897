//! Schedule item routes: waiving and derived balances.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{middleware::Principal, AppState};
use tradewind_db::repositories::ScheduleRepository;

use super::documents::schedule_error_response;

/// Creates the schedule item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedule-items/{id}/waive", post(waive_item))
        .route("/schedule-items/{id}/balance", get(item_balance))
}

/// Request body for waiving an item.
#[derive(Debug, Deserialize)]
pub struct WaiveRequest {
    /// Reason for the waiver (required).
    pub reason: String,
}

/// POST `/schedule-items/{id}/waive` - Waive a schedule item.
async fn waive_item(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<WaiveRequest>,
) -> impl IntoResponse {
    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.waive(id, principal.actor_id(), payload.reason).await {
        Ok(item) => (StatusCode::OK, Json(json!(item))).into_response(),
        Err(e) => schedule_error_response(&e),
    }
}

/// GET `/schedule-items/{id}/balance` - Derived paid/remaining balance.
async fn item_balance(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.item_balance(id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({
                "amount": balance.amount,
                "paid_amount": balance.paid_amount,
                "remaining_amount": balance.remaining_amount,
                "is_paid_in_full": balance.is_paid_in_full,
            })),
        )
            .into_response(),
        Err(e) => schedule_error_response(&e),
    }
}
