//! Trade document routes: creation, transitions, schedules, PO
//! generation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::error::{bad_request, internal_error};
use crate::{middleware::Principal, AppState};
use tradewind_core::document::{DocumentType, TradeStatus};
use tradewind_core::payment::PaymentDirection;
use tradewind_core::statemachine::TransitionContext;
use tradewind_db::repositories::document::{CreateDocumentInput, DocumentError};
use tradewind_db::repositories::schedule::ScheduleError;
use tradewind_db::repositories::transition::TransitionError;
use tradewind_db::repositories::{DocumentRepository, ScheduleRepository, TransitionRepository};
use tradewind_shared::types::Currency;

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", post(create_document).get(list_documents))
        .route("/documents/{id}", get(get_document))
        .route("/documents/{id}/transition", post(transition_document))
        .route("/documents/{id}/blocking", get(blocking_items))
        .route("/documents/{id}/purchase-order", post(generate_purchase_order))
        .route(
            "/documents/{id}/purchase-order/blockers",
            get(purchase_order_blockers),
        )
        .route("/documents/{id}/schedule", get(list_schedule))
        .route("/documents/{id}/schedule/generate", post(generate_schedule))
        .route(
            "/documents/{id}/schedule/regenerate",
            post(regenerate_schedule),
        )
        .route(
            "/documents/{id}/schedule/refresh-due",
            post(refresh_due_statuses),
        )
}

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Document type: "proforma_invoice", "purchase_order", "shipment".
    pub document_type: String,
    /// Counterparty name.
    pub counterparty: String,
    /// Total amount in minor units.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional direction override: "inbound" or "outbound".
    pub direction: Option<String>,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// Payment term template id.
    pub payment_term_id: Option<Uuid>,
}

/// Query parameters for listing documents.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    /// Filter by document type.
    pub document_type: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
}

/// Request body for a document status transition.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target status.
    pub to: String,
    /// Optional notes for the audit log.
    pub notes: Option<String>,
    /// Optional structured metadata for the audit log.
    pub metadata: Option<serde_json::Value>,
}

/// Query parameters for the blocking preview.
#[derive(Debug, Deserialize)]
pub struct BlockingQuery {
    /// The target status to evaluate.
    pub target: String,
}

/// Query parameters for the due-status sweep.
#[derive(Debug, Deserialize)]
pub struct RefreshDueQuery {
    /// Evaluation date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// POST `/documents` - Create a draft document.
async fn create_document(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateDocumentRequest>,
) -> impl IntoResponse {
    let _ = principal;

    let Some(document_type) = DocumentType::parse(&payload.document_type) else {
        return bad_request(format!("Unknown document type '{}'", payload.document_type));
    };
    let Some(currency) = Currency::parse(&payload.currency) else {
        return bad_request(format!("Unknown currency '{}'", payload.currency));
    };
    let direction = match payload.direction.as_deref() {
        None => None,
        Some(s) => match PaymentDirection::parse(s) {
            Some(direction) => Some(direction),
            None => return bad_request(format!("Unknown direction '{s}'")),
        },
    };

    let repo = DocumentRepository::new((*state.db).clone());
    match repo
        .create_document(CreateDocumentInput {
            document_type,
            counterparty: payload.counterparty,
            total_amount: payload.total_amount,
            currency,
            direction,
            issue_date: payload.issue_date,
            payment_term_id: payload.payment_term_id,
        })
        .await
    {
        Ok(document) => (StatusCode::CREATED, Json(json!(document))).into_response(),
        Err(e) => document_error_response(&e),
    }
}

/// GET `/documents` - List documents.
async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> impl IntoResponse {
    let document_type = match query.document_type.as_deref() {
        None => None,
        Some(s) => match DocumentType::parse(s) {
            Some(ty) => Some(ty),
            None => return bad_request(format!("Unknown document type '{s}'")),
        },
    };
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match TradeStatus::parse(s) {
            Some(status) => Some(status),
            None => return bad_request(format!("Unknown status '{s}'")),
        },
    };

    let repo = DocumentRepository::new((*state.db).clone());
    match repo.list(document_type, status).await {
        Ok(documents) => (StatusCode::OK, Json(json!(documents))).into_response(),
        Err(e) => document_error_response(&e),
    }
}

/// GET `/documents/{id}` - Fetch one document.
async fn get_document(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = DocumentRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(document) => (StatusCode::OK, Json(json!(document))).into_response(),
        Err(e) => document_error_response(&e),
    }
}

/// POST `/documents/{id}/transition` - Transition a document's status.
///
/// The blocking-condition check runs inside the transition itself; a
/// gated transition returns the blocking items.
async fn transition_document(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> impl IntoResponse {
    let Some(to) = TradeStatus::parse(&payload.to) else {
        return bad_request(format!("Unknown status '{}'", payload.to));
    };

    let mut ctx = TransitionContext::actor(principal.actor_id());
    ctx.notes = payload.notes;
    ctx.metadata = payload.metadata;

    let repo = TransitionRepository::new((*state.db).clone());
    match repo.transition_document(id, to, ctx, None).await {
        Ok(document) => (StatusCode::OK, Json(json!(document))).into_response(),
        Err(e) => transition_error_response(&e),
    }
}

/// GET `/documents/{id}/blocking` - Preview the items gating a target
/// status, without attempting the transition.
async fn blocking_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<BlockingQuery>,
) -> impl IntoResponse {
    let Some(target) = TradeStatus::parse(&query.target) else {
        return bad_request(format!("Unknown status '{}'", query.target));
    };

    let repo = DocumentRepository::new((*state.db).clone());
    match repo.blocking_items(id, target).await {
        Ok(blockers) => (StatusCode::OK, Json(json!(blockers))).into_response(),
        Err(e) => document_error_response(&e),
    }
}

/// POST `/documents/{id}/purchase-order` - Generate a PO from a
/// proforma invoice.
async fn generate_purchase_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let _ = principal;

    let repo = DocumentRepository::new((*state.db).clone());
    match repo.generate_purchase_order(id).await {
        Ok(purchase_order) => (StatusCode::CREATED, Json(json!(purchase_order))).into_response(),
        Err(e) => document_error_response(&e),
    }
}

/// GET `/documents/{id}/purchase-order/blockers` - Preview the items
/// gating PO generation (stricter subset; shipment-gating items do not
/// count).
async fn purchase_order_blockers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new((*state.db).clone());
    match repo.purchase_order_blockers(id).await {
        Ok(blockers) => (StatusCode::OK, Json(json!(blockers))).into_response(),
        Err(e) => document_error_response(&e),
    }
}

/// GET `/documents/{id}/schedule` - List the document's schedule items.
async fn list_schedule(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.list_items(id).await {
        Ok(items) => (StatusCode::OK, Json(json!(items))).into_response(),
        Err(e) => schedule_error_response(&e),
    }
}

/// POST `/documents/{id}/schedule/generate` - Generate the schedule.
async fn generate_schedule(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let _ = principal;

    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.generate(id).await {
        Ok(created) => (StatusCode::OK, Json(json!({ "created": created }))).into_response(),
        Err(e) => schedule_error_response(&e),
    }
}

/// POST `/documents/{id}/schedule/regenerate` - Incrementally
/// regenerate after a term change.
async fn regenerate_schedule(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let _ = principal;

    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.regenerate(id).await {
        Ok(created) => (StatusCode::OK, Json(json!({ "created": created }))).into_response(),
        Err(e) => schedule_error_response(&e),
    }
}

/// POST `/documents/{id}/schedule/refresh-due` - Sweep items into
/// due/overdue per their due dates.
async fn refresh_due_statuses(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Query(query): Query<RefreshDueQuery>,
) -> impl IntoResponse {
    let _ = principal;

    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.refresh_due_statuses(id, as_of).await {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))).into_response(),
        Err(e) => schedule_error_response(&e),
    }
}

pub(crate) fn document_error_response(e: &DocumentError) -> axum::response::Response {
    match e {
        DocumentError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": format!("Document {id} not found") })),
        )
            .into_response(),
        DocumentError::NegativeTotal(_) | DocumentError::NotAProformaInvoice(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation_error", "message": e.to_string() })),
        )
            .into_response(),
        DocumentError::PurchaseOrderBlocked { items } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "purchase_order_blocked",
                "message": e.to_string(),
                "blocking_items": items,
            })),
        )
            .into_response(),
        DocumentError::Sequence(_) | DocumentError::Database(_) => {
            error!(error = %e, "document operation failed");
            internal_error()
        }
    }
}

pub(crate) fn schedule_error_response(e: &ScheduleError) -> axum::response::Response {
    match e {
        ScheduleError::DocumentNotFound(_) | ScheduleError::ItemNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": e.to_string() })),
        )
            .into_response(),
        ScheduleError::WaiveReasonRequired => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation_error", "message": e.to_string() })),
        )
            .into_response(),
        ScheduleError::StateMachine(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.error_code().to_lowercase(), "message": err.to_string() })),
        )
            .into_response(),
        ScheduleError::UnknownCurrency(_) | ScheduleError::Database(_) => {
            error!(error = %e, "schedule operation failed");
            internal_error()
        }
    }
}

pub(crate) fn transition_error_response(e: &TransitionError) -> axum::response::Response {
    match e {
        TransitionError::DocumentNotFound(_) | TransitionError::PaymentNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": e.to_string() })),
        )
            .into_response(),
        TransitionError::Blocked { items, .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "transition_blocked",
                "message": e.to_string(),
                "blocking_items": items,
            })),
        )
            .into_response(),
        TransitionError::StateMachine(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.error_code().to_lowercase(), "message": err.to_string() })),
        )
            .into_response(),
        TransitionError::SideEffect(_) | TransitionError::Database(_) => {
            error!(error = %e, "transition failed");
            internal_error()
        }
    }
}
