// src/lib.rs

use axum::Router;
use axum::routing::get;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use services::{exchange_rate_api::ExchangeRateApiClient, live_rates::LiveRateCache};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub provider: ExchangeRateApiClient,
    pub live_rates: Arc<LiveRateCache>,
    pub cron_secret: String,
    pub sync_base_currencies: Vec<String>,
}

pub mod entities {
    pub mod prelude;
    pub mod exchange_rate_pairs;
    pub mod user_transactions;
}

pub mod services {
    pub mod exchange_rate_api;
    pub mod live_rates;
    pub mod rate_store;
    pub mod rate_sync;
}

pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;

/// Full API surface; the caller owns state construction and the listener
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_lilygem))
        .route(
            "/api/exchange-rate",
            get(handlers::exchange_rate::get_exchange_rates),
        )
        .route(
            "/api/exchange-rate/live",
            get(handlers::exchange_rate::get_live_rate),
        )
        .route(
            "/api/cron/exchange-rates",
            get(handlers::cron::trigger_exchange_rates_sync),
        )
        .route(
            "/api/transactions",
            get(handlers::transaction::get_transactions)
                .post(handlers::transaction::create_transaction),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hello_lilygem() -> &'static str {
    "Hello from LilyGem Backend! 💎"
}
