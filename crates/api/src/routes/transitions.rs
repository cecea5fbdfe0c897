//! Read-only audit log routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::error::internal_error;
use crate::AppState;
use tradewind_db::repositories::transition::TransitionLogFilter;
use tradewind_db::repositories::TransitionRepository;

/// Creates the transition log routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transitions", get(list_transitions))
}

/// Query parameters for the audit log.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Restrict to one entity kind (e.g., "trade_document").
    pub entity_kind: Option<String>,
    /// Restrict to one entity.
    pub entity_id: Option<Uuid>,
    /// Restrict to one acting principal.
    pub actor_id: Option<Uuid>,
    /// Lower bound on the transition time.
    pub after: Option<DateTime<Utc>>,
    /// Upper bound on the transition time.
    pub before: Option<DateTime<Utc>>,
}

/// GET `/transitions` - Query the append-only audit log.
async fn list_transitions(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> impl IntoResponse {
    let repo = TransitionRepository::new((*state.db).clone());
    match repo
        .list_log(TransitionLogFilter {
            entity_kind: query.entity_kind,
            entity_id: query.entity_id,
            actor_id: query.actor_id,
            occurred_after: query.after,
            occurred_before: query.before,
        })
        .await
    {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))).into_response(),
        Err(e) => {
            error!(error = %e, "audit log query failed");
            internal_error()
        }
    }
}
