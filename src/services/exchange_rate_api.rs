use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::RateError;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; LilyGem/1.0)";

/// Canonical per-day conversion table, normalized from either upstream shape
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub base: String,
    pub date: NaiveDate,
    pub rates: HashMap<String, f64>,
}

/// Outbound leg to the rate provider. No caching and no retries here, callers
/// decide both.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, RateError>;

    /// May return `UnsupportedOperation` when the configured provider plan has
    /// no history endpoint; callers treat that as "skip this date".
    async fn fetch_historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<RateSnapshot, RateError>;
}

/// Client for v6.exchangerate-api.com
#[derive(Clone)]
pub struct ExchangeRateApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    historical_enabled: bool,
}

// LATEST API REQUEST FORMAT
// GET {base_url}/YOUR-API-KEY/latest/USD
// HISTORICAL API REQUEST FORMAT
// GET {base_url}/YOUR-API-KEY/history/USD/YEAR/MONTH/DAY

#[derive(Debug, Deserialize)]
struct LatestRatesPayload {
    result: String,
    base_code: String,
    conversion_rates: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalRatesPayload {
    result: String,
    base_code: String,
    year: i32,
    month: u32,
    day: u32,
    conversion_rates: HashMap<String, f64>,
}

/// The two upstream response shapes, collapsed at this boundary so the rest of
/// the crate only ever sees `RateSnapshot`.
enum ProviderResponse {
    Latest(LatestRatesPayload),
    Historical(HistoricalRatesPayload),
}

impl ProviderResponse {
    fn into_snapshot(self) -> Result<RateSnapshot, RateError> {
        match self {
            ProviderResponse::Latest(payload) => {
                if payload.result != "success" {
                    return Err(RateError::UpstreamResult(payload.result));
                }
                // "latest" carries no date echo; it is today's table
                Ok(RateSnapshot {
                    base: payload.base_code,
                    date: Utc::now().date_naive(),
                    rates: payload.conversion_rates,
                })
            }
            ProviderResponse::Historical(payload) => {
                if payload.result != "success" {
                    return Err(RateError::UpstreamResult(payload.result));
                }
                let date = NaiveDate::from_ymd_opt(payload.year, payload.month, payload.day)
                    .ok_or_else(|| {
                        RateError::UpstreamResult(format!(
                            "invalid date echo {}-{}-{}",
                            payload.year, payload.month, payload.day
                        ))
                    })?;
                Ok(RateSnapshot {
                    base: payload.base_code,
                    date,
                    rates: payload.conversion_rates,
                })
            }
        }
    }
}

impl ExchangeRateApiClient {
    pub fn new(api_key: String, base_url: String, historical_enabled: bool) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            historical_enabled,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RateError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RateError::UpstreamStatus { status, body });
        }

        // Non-JSON payloads are an error even on a 200
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if !content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
        {
            return Err(RateError::UpstreamNotJson { content_type });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiClient {
    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, RateError> {
        tracing::debug!("Fetching latest {} rates from provider", base);

        let url = format!("{}/{}/latest/{}", self.base_url, self.api_key, base);
        let payload: LatestRatesPayload = self.get_json(&url).await?;

        ProviderResponse::Latest(payload).into_snapshot()
    }

    async fn fetch_historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<RateSnapshot, RateError> {
        // Known up front from configuration, so don't attempt a call the plan
        // cannot serve
        if !self.historical_enabled {
            return Err(RateError::UnsupportedOperation);
        }

        tracing::debug!("Fetching historical {} rates for {} from provider", base, date);

        let url = format!(
            "{}/{}/history/{}/{}/{}/{}",
            self.base_url,
            self.api_key,
            base,
            date.year(),
            date.month(),
            date.day()
        );
        let payload: HistoricalRatesPayload = self.get_json(&url).await?;

        ProviderResponse::Historical(payload).into_snapshot()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider for reconciler and sync-job tests: one fixed table,
    /// optional per-date and per-base failures, call counters.
    #[derive(Default)]
    pub struct ScriptedProvider {
        pub rates: HashMap<String, f64>,
        pub unsupported: bool,
        pub fail_latest_bases: HashSet<String>,
        pub fail_historical: HashSet<NaiveDate>,
        pub latest_calls: AtomicUsize,
        pub historical_calls: AtomicUsize,
    }

    impl ScriptedProvider {
        pub fn quoting(rates: &[(&str, f64)]) -> Self {
            Self {
                rates: rates
                    .iter()
                    .map(|(code, rate)| (code.to_string(), *rate))
                    .collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> (usize, usize) {
            (
                self.latest_calls.load(Ordering::SeqCst),
                self.historical_calls.load(Ordering::SeqCst),
            )
        }

        fn upstream_down() -> RateError {
            RateError::UpstreamStatus {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "down".to_string(),
            }
        }
    }

    #[async_trait]
    impl RateProvider for ScriptedProvider {
        async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, RateError> {
            self.latest_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_latest_bases.contains(base) {
                return Err(Self::upstream_down());
            }
            Ok(RateSnapshot {
                base: base.to_string(),
                date: Utc::now().date_naive(),
                rates: self.rates.clone(),
            })
        }

        async fn fetch_historical(
            &self,
            base: &str,
            date: NaiveDate,
        ) -> Result<RateSnapshot, RateError> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            if self.unsupported {
                return Err(RateError::UnsupportedOperation);
            }
            if self.fail_historical.contains(&date) {
                return Err(Self::upstream_down());
            }
            Ok(RateSnapshot {
                base: base.to_string(),
                date,
                rates: self.rates.clone(),
            })
        }
    }
}
