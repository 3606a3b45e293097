//! Scheduled synchronization of today's rates into the store.
//!
//! Invoked by an external time-based trigger through the cron endpoint; each
//! invocation runs to completion, there is no long-lived background task.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::RateError;
use crate::services::exchange_rate_api::RateProvider;
use crate::services::rate_store::{NewRatePair, RateStore};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    Stored,
    AlreadyUpToDate,
    Error,
}

/// Per-base outcome of one sync invocation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSyncOutcome {
    pub base: String,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Pull today's "latest" table for each configured base currency and upsert
/// whichever pairs the store does not have yet. One base's failure is recorded
/// in its outcome and the remaining bases still run.
pub async fn sync_latest_rates(
    store: &dyn RateStore,
    provider: &dyn RateProvider,
    bases: &[String],
) -> Vec<BaseSyncOutcome> {
    let today = Utc::now().date_naive();
    let mut outcomes = Vec::with_capacity(bases.len());

    for base in bases {
        let outcome = match sync_base(store, provider, base, today).await {
            Ok(0) => {
                tracing::info!("{} rates already up to date for {}", base, today);
                BaseSyncOutcome {
                    base: base.clone(),
                    status: SyncStatus::AlreadyUpToDate,
                    stored: None,
                    error: None,
                }
            }
            Ok(stored) => {
                tracing::info!("Stored {} missing {} pairs for {}", stored, base, today);
                BaseSyncOutcome {
                    base: base.clone(),
                    status: SyncStatus::Stored,
                    stored: Some(stored),
                    error: None,
                }
            }
            Err(err) => {
                tracing::error!("Failed to sync {} rates: {}", base, err);
                BaseSyncOutcome {
                    base: base.clone(),
                    status: SyncStatus::Error,
                    stored: None,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Returns how many pairs were missing for today and got stored
async fn sync_base(
    store: &dyn RateStore,
    provider: &dyn RateProvider,
    base: &str,
    today: NaiveDate,
) -> Result<usize, RateError> {
    let snapshot = provider.fetch_latest(base).await?;

    let provider_targets: Vec<String> = snapshot
        .rates
        .keys()
        .filter(|target| target.as_str() != base)
        .cloned()
        .collect();

    let stored_rows = store.query(base, &provider_targets, today, today).await?;
    let stored_targets: HashSet<&str> = stored_rows
        .iter()
        .map(|row| row.target_currency.as_str())
        .collect();

    let missing: Vec<NewRatePair> = snapshot
        .rates
        .iter()
        .filter(|(target, _)| {
            target.as_str() != base && !stored_targets.contains(target.as_str())
        })
        .filter_map(|(target, rate)| {
            Decimal::from_f64_retain(*rate).map(|rate| NewRatePair {
                date: today,
                base_currency: base.to_string(),
                target_currency: target.clone(),
                rate,
            })
        })
        .collect();

    let count = missing.len();
    store.upsert(missing).await?;

    Ok(count)
}
