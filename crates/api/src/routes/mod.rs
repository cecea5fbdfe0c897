//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod documents;
pub mod exchange_rates;
pub mod health;
pub mod payments;
pub mod schedule_items;
pub mod transitions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(documents::routes())
        .merge(payments::routes())
        .merge(schedule_items::routes())
        .merge(exchange_rates::routes())
        .merge(transitions::routes())
}
