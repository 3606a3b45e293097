use chrono::Duration;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;

use lilygem_backend::AppState;
use lilygem_backend::services::exchange_rate_api::ExchangeRateApiClient;
use lilygem_backend::services::live_rates::LiveRateCache;

/// AppState over a mock connection, for driving the router through
/// validation and auth paths that never reach the database.
pub fn mock_app_state() -> AppState {
    mock_app_state_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// Same, but with caller-prepared query results on the mock connection.
/// The provider points at an unroutable local address so any fetch fails fast.
pub fn mock_app_state_with_db(db: DatabaseConnection) -> AppState {
    AppState {
        db,
        provider: ExchangeRateApiClient::new(
            "test-key".to_string(),
            "http://127.0.0.1:1".to_string(),
            true,
        ),
        live_rates: Arc::new(LiveRateCache::new(Duration::hours(3))),
        cron_secret: "test-cron-secret".to_string(),
        sync_base_currencies: vec!["USD".to_string()],
    }
}
