use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use chrono::Utc;

use crate::AppState;
use crate::handlers::unauthorized;
use crate::jobs::rates_sync;
use crate::models::ErrorResponse;
use crate::models::exchange_rate::CronSyncResponse;
use crate::services::rate_store::SeaOrmRateStore;

/// Handler for GET /api/cron/exchange-rates
///
/// Invoked by the external scheduler; the bearer token gates it. Runs the
/// sync to completion within this request and reports per-base outcomes.
pub async fn trigger_exchange_rates_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CronSyncResponse>, (StatusCode, Json<ErrorResponse>)> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", state.cron_secret));

    if !authorized {
        return Err(unauthorized());
    }

    tracing::info!(
        "Scheduled exchange-rate sync triggered for {:?}",
        state.sync_base_currencies
    );

    let store = SeaOrmRateStore::new(state.db.clone());
    let results =
        rates_sync::sync_latest_rates(&store, &state.provider, &state.sync_base_currencies).await;

    Ok(Json(CronSyncResponse {
        success: true,
        date: Utc::now().date_naive(),
        results,
    }))
}
