use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::jobs::rates_sync::BaseSyncOutcome;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateQuery {
    pub base: Option<String>,
    /// Comma-separated target currency codes
    pub symbols: Option<String>,
    pub start_date: Option<String>, // YYYY-MM-DD format
    pub end_date: Option<String>,   // YYYY-MM-DD format
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSeriesEntry {
    pub date: NaiveDate,
    pub base: String,
    pub rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateResponse {
    pub base: String,
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Day-records in the returned series
    pub total_records: usize,
    /// Day-records fetched from the provider by this request
    pub fetched_records: usize,
    pub rates: Vec<RateSeriesEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRateQuery {
    pub base: Option<String>,
    pub target: Option<String>,
    pub skip_cache: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRateResponse {
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSyncResponse {
    pub success: bool,
    pub date: NaiveDate,
    pub results: Vec<BaseSyncOutcome>,
}
