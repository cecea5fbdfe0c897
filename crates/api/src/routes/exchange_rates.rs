//! Exchange rate management routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::error::{bad_request, internal_error};
use crate::{middleware::Principal, AppState};
use tradewind_core::currency::RateLookupMethod;
use tradewind_db::entities::sea_orm_active_enums::{RateSource, RateStatus};
use tradewind_db::repositories::exchange_rate::{CreateExchangeRateInput, ExchangeRateError};
use tradewind_db::repositories::ExchangeRateRepository;
use tradewind_shared::types::Currency;

/// Creates the exchange rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exchange-rates", post(create_rate).get(list_rates))
        .route("/exchange-rates/lookup", get(lookup_rate))
        .route("/exchange-rates/{id}/approve", post(approve_rate))
}

/// Request body for recording an exchange rate.
#[derive(Debug, Deserialize)]
pub struct CreateExchangeRateRequest {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Exchange rate (from_currency * rate = to_currency).
    pub rate: Decimal,
    /// Effective date for this rate.
    pub effective_date: NaiveDate,
    /// Source of the rate: "manual" (default) or "api".
    pub source: Option<String>,
    /// Optional reference (e.g., feed provider).
    pub source_reference: Option<String>,
}

/// Query parameters for a rate lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Date for the lookup (defaults to today).
    pub date: Option<NaiveDate>,
}

/// Response for a rate lookup.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Resolved exchange rate.
    pub rate: String,
    /// How the rate was obtained: "direct", "inverse", "triangulated".
    pub lookup_method: String,
}

/// POST `/exchange-rates` - Record a rate.
///
/// Manual entries are approved immediately; feed entries stay pending
/// until approved.
async fn create_rate(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateExchangeRateRequest>,
) -> impl IntoResponse {
    let Some(from_currency) = Currency::parse(&payload.from_currency) else {
        return bad_request(format!("Unknown currency '{}'", payload.from_currency));
    };
    let Some(to_currency) = Currency::parse(&payload.to_currency) else {
        return bad_request(format!("Unknown currency '{}'", payload.to_currency));
    };

    let source = match payload.source.as_deref() {
        None | Some("manual") => RateSource::Manual,
        Some("api") => RateSource::Api,
        Some(other) => return bad_request(format!("Unknown rate source '{other}'")),
    };
    let status = match source {
        RateSource::Manual => RateStatus::Approved,
        RateSource::Api => RateStatus::Pending,
    };

    let repo = ExchangeRateRepository::new((*state.db).clone(), state.base_currency);
    match repo
        .upsert_rate(CreateExchangeRateInput {
            from_currency,
            to_currency,
            rate: payload.rate,
            effective_date: payload.effective_date,
            source,
            status,
            source_reference: payload.source_reference,
            created_by: Some(principal.actor_id().into_inner()),
        })
        .await
    {
        Ok(rate) => (StatusCode::CREATED, Json(json!(rate))).into_response(),
        Err(e) => rate_error_response(&e),
    }
}

/// GET `/exchange-rates` - List stored rates.
async fn list_rates(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ExchangeRateRepository::new((*state.db).clone(), state.base_currency);
    match repo.list_rates().await {
        Ok(rates) => (StatusCode::OK, Json(json!(rates))).into_response(),
        Err(e) => rate_error_response(&e),
    }
}

/// GET `/exchange-rates/lookup` - Resolve a rate for a currency pair.
async fn lookup_rate(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> impl IntoResponse {
    let Some(from) = Currency::parse(&query.from) else {
        return bad_request(format!("Unknown currency '{}'", query.from));
    };
    let Some(to) = Currency::parse(&query.to) else {
        return bad_request(format!("Unknown currency '{}'", query.to));
    };
    let date = query.date.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let repo = ExchangeRateRepository::new((*state.db).clone(), state.base_currency);
    match repo.find_rate(from, to, date).await {
        Ok(resolved) => {
            let response = LookupResponse {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate: resolved.rate.to_string(),
                lookup_method: match resolved.method {
                    RateLookupMethod::Direct => "direct".to_string(),
                    RateLookupMethod::Inverse => "inverse".to_string(),
                    RateLookupMethod::Triangulated => "triangulated".to_string(),
                },
            };
            (StatusCode::OK, Json(json!(response))).into_response()
        }
        Err(e) => rate_error_response(&e),
    }
}

/// POST `/exchange-rates/{id}/approve` - Approve a pending rate.
async fn approve_rate(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExchangeRateRepository::new((*state.db).clone(), state.base_currency);
    match repo
        .approve_rate(id, Some(principal.actor_id().into_inner()))
        .await
    {
        Ok(rate) => (StatusCode::OK, Json(json!(rate))).into_response(),
        Err(e) => rate_error_response(&e),
    }
}

fn rate_error_response(e: &ExchangeRateError) -> axum::response::Response {
    match e {
        ExchangeRateError::NonPositiveRate
        | ExchangeRateError::SameCurrency
        | ExchangeRateError::UnknownCurrency(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation_error", "message": e.to_string() })),
        )
            .into_response(),
        ExchangeRateError::RateNotFound(_) | ExchangeRateError::RateUnavailable(..) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "rate_unavailable", "message": e.to_string() })),
        )
            .into_response(),
        ExchangeRateError::Database(_) => {
            error!(error = %e, "exchange rate operation failed");
            internal_error()
        }
    }
}
