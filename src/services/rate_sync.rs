//! Gap-fill reconciliation between the rate store and the upstream provider.
//!
//! Given a date range and currency pair set, fetches only the dates that are
//! not fully covered yet, persists each date as soon as its fetch lands, and
//! returns the assembled series. Fetches run sequentially in ascending date
//! order so an interrupted run can resume by re-deriving the same missing set.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, HashMap};
use tokio::time::Instant;

use crate::error::RateError;
use crate::services::exchange_rate_api::{RateProvider, RateSnapshot};
use crate::services::rate_store::{NewRatePair, RateStore};

/// One day of the assembled series
#[derive(Debug, Clone, PartialEq)]
pub struct DayRates {
    pub date: NaiveDate,
    pub base: String,
    pub rates: HashMap<String, f64>,
}

/// Reconciliation result: the series plus enough counts for the caller to
/// tell "nothing changed" from "something is still missing".
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub total_records: usize,
    pub fetched_records: usize,
    pub rates: Vec<DayRates>,
}

/// Fill the gaps in `[start_date, end_date]` for `base`/`targets` and return
/// the union of stored + freshly fetched rates, sorted ascending by date.
///
/// A date counts as present only when every requested target has a stored row;
/// partial coverage marks the whole date as missing. A date counts as fetched
/// only once its upsert has succeeded. Past the deadline, remaining dates are
/// left unfilled and the partial outcome is returned.
pub async fn reconcile_range(
    store: &dyn RateStore,
    provider: &dyn RateProvider,
    base: &str,
    targets: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    deadline: Option<Instant>,
) -> Result<ReconcileOutcome, RateError> {
    let existing = store.query(base, targets, start_date, end_date).await?;

    // Fold stored rows into per-day tables; BTreeMap keeps the series sorted
    let mut series: BTreeMap<NaiveDate, HashMap<String, f64>> = BTreeMap::new();
    for row in &existing {
        if let Some(rate) = row.rate.to_f64() {
            series
                .entry(row.date)
                .or_default()
                .insert(row.target_currency.clone(), rate);
        }
    }

    let missing_dates: Vec<NaiveDate> = start_date
        .iter_days()
        .take_while(|date| *date <= end_date)
        .filter(|date| {
            series
                .get(date)
                .is_none_or(|day| targets.iter().any(|target| !day.contains_key(target)))
        })
        .collect();

    tracing::debug!(
        "Reconciling {} {:?} {}..={}: {} stored rows, {} missing dates",
        base,
        targets,
        start_date,
        end_date,
        existing.len(),
        missing_dates.len()
    );

    let today = Utc::now().date_naive();
    let mut fetched_records = 0;

    for date in missing_dates {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                tracing::warn!(
                    "Reconciliation deadline reached before {}, returning partial range",
                    date
                );
                break;
            }
        }

        // The provider has no historical row for today yet; today comes from
        // the "latest" table, stamped with the requested date
        let fetched = if date == today {
            provider
                .fetch_latest(base)
                .await
                .map(|snapshot| RateSnapshot { date, ..snapshot })
        } else {
            provider.fetch_historical(base, date).await
        };

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(RateError::UnsupportedOperation) => {
                tracing::debug!("Historical rates unavailable, leaving {} unfilled", date);
                continue;
            }
            Err(err) if err.is_upstream() && date != today => {
                tracing::warn!("Failed to fetch {} rates for {}: {}", base, date, err);
                continue;
            }
            // No substitute date exists for today's table
            Err(err) => return Err(err),
        };

        // Persist every target the provider returned, not just the requested
        // ones, so later gap-fills for other targets find the date populated
        if let Err(err) = store.upsert(snapshot_to_pairs(&snapshot, date)).await {
            tracing::error!("Failed to store {} rates for {}: {}", base, date, err);
            continue;
        }

        fetched_records += 1;

        let day = series.entry(date).or_default();
        for target in targets {
            if let Some(rate) = snapshot.rates.get(target) {
                day.insert(target.clone(), *rate);
            }
        }
    }

    // Project each day down to the requested targets; days with no coverage
    // at all are omitted rather than returned empty
    let rates: Vec<DayRates> = series
        .into_iter()
        .filter_map(|(date, day)| {
            let rates: HashMap<String, f64> = targets
                .iter()
                .filter_map(|target| day.get(target).map(|rate| (target.clone(), *rate)))
                .collect();

            (!rates.is_empty()).then(|| DayRates {
                date,
                base: base.to_string(),
                rates,
            })
        })
        .collect();

    Ok(ReconcileOutcome {
        total_records: rates.len(),
        fetched_records,
        rates,
    })
}

fn snapshot_to_pairs(snapshot: &RateSnapshot, date: NaiveDate) -> Vec<NewRatePair> {
    snapshot
        .rates
        .iter()
        // Skip self-references
        .filter(|(target, _)| target.as_str() != snapshot.base)
        .filter_map(|(target, rate)| {
            Decimal::from_f64_retain(*rate).map(|rate| NewRatePair {
                date,
                base_currency: snapshot.base.clone(),
                target_currency: target.clone(),
                rate,
            })
        })
        .collect()
}
