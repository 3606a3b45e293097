use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use tokio::time::{Duration, Instant};

use crate::AppState;
use crate::error::RateError;
use crate::handlers::bad_request;
use crate::models::ErrorResponse;
use crate::models::exchange_rate::{
    ExchangeRateQuery, ExchangeRateResponse, LiveRateQuery, LiveRateResponse, RateSeriesEntry,
};
use crate::services::rate_store::SeaOrmRateStore;
use crate::services::rate_sync;

/// Upper bound on one reconciliation walk; dates past it stay unfilled and
/// the response reports the partial coverage
const RECONCILE_BUDGET: Duration = Duration::from_secs(60);

fn rate_error_response(err: RateError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        RateError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RateError::MissingTarget { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDate, (StatusCode, Json<ErrorResponse>)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| bad_request(&format!("Invalid {} format. Use YYYY-MM-DD", name)))
}

/// Handler for GET /api/exchange-rate
///
/// Serves the historical series for a base/symbols pair set, gap-filling the
/// store from the provider for whatever part of the range is not persisted yet.
pub async fn get_exchange_rates(
    State(state): State<AppState>,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<Json<ExchangeRateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let base = query
        .base
        .filter(|value| !value.is_empty())
        .ok_or_else(|| bad_request("Base currency is required"))?
        .to_uppercase();

    let symbols: Vec<String> = query
        .symbols
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(bad_request("Symbols are required"));
    }

    let start_str = query
        .start_date
        .filter(|value| !value.is_empty())
        .ok_or_else(|| bad_request("startDate is required"))?;
    let start_date = parse_date(&start_str, "startDate")?;

    let end_date = match query.end_date.filter(|value| !value.is_empty()) {
        Some(value) => parse_date(&value, "endDate")?,
        None => Utc::now().date_naive(),
    };

    if start_date > end_date {
        return Err(bad_request("startDate must be before or equal to endDate"));
    }

    tracing::info!(
        "Fetching exchange rates {} -> {:?} from {} to {}",
        base,
        symbols,
        start_date,
        end_date
    );

    let store = SeaOrmRateStore::new(state.db.clone());
    let outcome = rate_sync::reconcile_range(
        &store,
        &state.provider,
        &base,
        &symbols,
        start_date,
        end_date,
        Some(Instant::now() + RECONCILE_BUDGET),
    )
    .await
    .map_err(rate_error_response)?;

    let rates: Vec<RateSeriesEntry> = outcome
        .rates
        .into_iter()
        .map(|day| RateSeriesEntry {
            date: day.date,
            base: day.base,
            rates: day.rates,
        })
        .collect();

    Ok(Json(ExchangeRateResponse {
        base,
        symbols,
        start_date,
        end_date,
        total_records: outcome.total_records,
        fetched_records: outcome.fetched_records,
        rates,
    }))
}

/// Handler for GET /api/exchange-rate/live
pub async fn get_live_rate(
    State(state): State<AppState>,
    Query(query): Query<LiveRateQuery>,
) -> Result<Json<LiveRateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(base), Some(target)) = (
        query.base.filter(|value| !value.is_empty()),
        query.target.filter(|value| !value.is_empty()),
    ) else {
        return Err(bad_request("base and target are required"));
    };

    let quote = state
        .live_rates
        .get_rate(
            &state.provider,
            &base.to_uppercase(),
            &target.to_uppercase(),
            query.skip_cache.unwrap_or(false),
        )
        .await
        .map_err(rate_error_response)?;

    Ok(Json(LiveRateResponse {
        base: quote.base,
        target: quote.target,
        rate: quote.rate,
        cached: quote.cached,
        cache_timestamp: quote.cache_timestamp,
    }))
}
