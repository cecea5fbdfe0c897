//! Tradewind API Server
//!
//! Main entry point for the Tradewind payment-engine service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradewind_api::{create_router, AppState};
use tradewind_db::connect;
use tradewind_shared::types::Currency;
use tradewind_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradewind=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let base_currency = Currency::parse(&config.finance.base_currency)
        .ok_or_else(|| anyhow::anyhow!("unsupported base currency {}", config.finance.base_currency))?;
    info!(base_currency = %base_currency, "Finance engine configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        base_currency,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
