//! Payment routes: recording, approval decisions, and allocations.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::error::{bad_request, internal_error};
use crate::{middleware::Principal, AppState};
use tradewind_core::payment::{PaymentDirection, PaymentStatus};
use tradewind_db::repositories::allocation::{AllocateInput, AllocationError};
use tradewind_db::repositories::payment::{CreatePaymentInput, PaymentError};
use tradewind_db::repositories::{AllocationRepository, PaymentRepository};
use tradewind_shared::types::Currency;

use super::documents::transition_error_response;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment).get(list_payments))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/{id}/approve", post(approve_payment))
        .route("/payments/{id}/reject", post(reject_payment))
        .route("/payments/{id}/cancel", post(cancel_payment))
        .route("/payments/{id}/allocations", post(allocate).get(list_allocations))
        .route("/allocations/{id}", delete(deallocate))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Direction: "inbound" or "outbound".
    pub direction: String,
    /// Amount in minor units.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Explicit exchange rate, if known at recording time.
    pub exchange_rate: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Query parameters for listing payments.
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    /// Filter by status.
    pub status: Option<String>,
}

/// Request body for an approval decision with notes.
#[derive(Debug, Deserialize, Default)]
pub struct DecisionRequest {
    /// Notes or reason for the decision.
    pub notes: Option<String>,
}

/// Request body for rejecting a payment.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Reason for the rejection (required).
    pub reason: String,
}

/// Request body for creating an allocation.
#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    /// The targeted schedule item.
    pub schedule_item_id: Uuid,
    /// Amount in payment currency minor units.
    pub amount: i64,
    /// Explicit exchange rate; overrides lookup when supplied.
    pub exchange_rate: Option<Decimal>,
}

/// POST `/payments` - Record a payment pending approval.
async fn create_payment(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    let Some(direction) = PaymentDirection::parse(&payload.direction) else {
        return bad_request(format!("Unknown direction '{}'", payload.direction));
    };
    let Some(currency) = Currency::parse(&payload.currency) else {
        return bad_request(format!("Unknown currency '{}'", payload.currency));
    };

    let repo = PaymentRepository::new((*state.db).clone());
    match repo
        .create_payment(CreatePaymentInput {
            direction,
            amount: payload.amount,
            currency,
            exchange_rate: payload.exchange_rate,
            notes: payload.notes,
            created_by: Some(principal.actor_id()),
        })
        .await
    {
        Ok(payment) => (StatusCode::CREATED, Json(json!(payment))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// GET `/payments` - List payments.
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match PaymentStatus::parse(s) {
            Some(status) => Some(status),
            None => return bad_request(format!("Unknown status '{s}'")),
        },
    };

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.list(status).await {
        Ok(payments) => (StatusCode::OK, Json(json!(payments))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// GET `/payments/{id}` - Fetch one payment.
async fn get_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(payment) => (StatusCode::OK, Json(json!(payment))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// POST `/payments/{id}/approve` - Approve a pending payment.
async fn approve_payment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    payload: Option<Json<DecisionRequest>>,
) -> impl IntoResponse {
    let notes = payload.and_then(|Json(p)| p.notes);
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.approve(id, principal.actor_id(), notes).await {
        Ok(payment) => (StatusCode::OK, Json(json!(payment))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// POST `/payments/{id}/reject` - Reject a pending payment.
async fn reject_payment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    if payload.reason.trim().is_empty() {
        return bad_request("Rejection reason is required".to_string());
    }

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.reject(id, principal.actor_id(), payload.reason).await {
        Ok(payment) => (StatusCode::OK, Json(json!(payment))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// POST `/payments/{id}/cancel` - Cancel a pending or approved payment.
async fn cancel_payment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    payload: Option<Json<DecisionRequest>>,
) -> impl IntoResponse {
    let notes = payload.and_then(|Json(p)| p.notes);
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.cancel(id, principal.actor_id(), notes).await {
        Ok(payment) => (StatusCode::OK, Json(json!(payment))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// POST `/payments/{id}/allocations` - Allocate the payment against a
/// schedule item.
///
/// Responds with the allocation and a `rate_fallback` warning flag when
/// no exchange rate was resolvable and amounts were treated 1:1.
async fn allocate(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<AllocateRequest>,
) -> impl IntoResponse {
    let repo = AllocationRepository::new((*state.db).clone(), state.base_currency);
    match repo
        .allocate(AllocateInput {
            payment_id: id,
            schedule_item_id: payload.schedule_item_id,
            amount: payload.amount,
            explicit_rate: payload.exchange_rate,
            created_by: Some(principal.actor_id()),
        })
        .await
    {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(json!({
                "allocation": outcome.allocation,
                "rate_fallback": outcome.rate_fallback,
                "document_paid_amount": outcome.document_paid_amount,
            })),
        )
            .into_response(),
        Err(e) => allocation_error_response(&e),
    }
}

/// GET `/payments/{id}/allocations` - List the payment's allocations.
async fn list_allocations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AllocationRepository::new((*state.db).clone(), state.base_currency);
    match repo.list_for_payment(id).await {
        Ok(allocations) => (StatusCode::OK, Json(json!(allocations))).into_response(),
        Err(e) => allocation_error_response(&e),
    }
}

/// DELETE `/allocations/{id}` - Remove an allocation and reconcile the
/// document's cached paid amount.
async fn deallocate(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let _ = principal;

    let repo = AllocationRepository::new((*state.db).clone(), state.base_currency);
    match repo.deallocate(id).await {
        Ok(paid) => (
            StatusCode::OK,
            Json(json!({ "document_paid_amount": paid })),
        )
            .into_response(),
        Err(e) => allocation_error_response(&e),
    }
}

fn payment_error_response(e: &PaymentError) -> axum::response::Response {
    match e {
        PaymentError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": e.to_string() })),
        )
            .into_response(),
        PaymentError::InvalidAmount(_) | PaymentError::NonPositiveRate => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation_error", "message": e.to_string() })),
        )
            .into_response(),
        PaymentError::Transition(err) => transition_error_response(err),
        PaymentError::Sequence(_) | PaymentError::Database(_) => {
            error!(error = %e, "payment operation failed");
            internal_error()
        }
    }
}

fn allocation_error_response(e: &AllocationError) -> axum::response::Response {
    match e {
        AllocationError::PaymentNotFound(_)
        | AllocationError::ItemNotFound(_)
        | AllocationError::DocumentNotFound(_)
        | AllocationError::AllocationNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": e.to_string() })),
        )
            .into_response(),
        AllocationError::Rule(rule) => {
            let status =
                StatusCode::from_u16(rule.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            (
                status,
                Json(json!({
                    "error": rule.error_code().to_lowercase(),
                    "message": rule.to_string(),
                })),
            )
                .into_response()
        }
        AllocationError::StateMachine(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.error_code().to_lowercase(), "message": err.to_string() })),
        )
            .into_response(),
        AllocationError::UnknownCurrency(_) | AllocationError::Database(_) => {
            error!(error = %e, "allocation operation failed");
            internal_error()
        }
    }
}
