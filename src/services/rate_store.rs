use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{exchange_rate_pairs, prelude::*};
use crate::error::RateError;

/// One rate fact to persist. `created_at` is stamped by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRatePair {
    pub date: NaiveDate,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
}

/// Durable store of daily rate pairs, unique per (date, base, target).
///
/// Only upsert and range query; nothing in the application deletes rates.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Idempotent batch upsert; re-applying the same pairs leaves the stored
    /// state unchanged, conflicting rows are replaced in place.
    async fn upsert(&self, pairs: Vec<NewRatePair>) -> Result<(), RateError>;

    /// Rows for `base` whose target is in `targets`, inclusive date bounds.
    /// Ordering is the caller's concern.
    async fn query(
        &self,
        base: &str,
        targets: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<exchange_rate_pairs::Model>, RateError>;
}

pub struct SeaOrmRateStore {
    db: DatabaseConnection,
}

impl SeaOrmRateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RateStore for SeaOrmRateStore {
    async fn upsert(&self, pairs: Vec<NewRatePair>) -> Result<(), RateError> {
        if pairs.is_empty() {
            return Ok(());
        }

        let models: Vec<exchange_rate_pairs::ActiveModel> = pairs
            .into_iter()
            .map(|pair| exchange_rate_pairs::ActiveModel {
                date: Set(pair.date),
                base_currency: Set(pair.base_currency),
                target_currency: Set(pair.target_currency),
                rate: Set(pair.rate),
                ..Default::default()
            })
            .collect();

        ExchangeRatePairs::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    exchange_rate_pairs::Column::Date,
                    exchange_rate_pairs::Column::BaseCurrency,
                    exchange_rate_pairs::Column::TargetCurrency,
                ])
                .update_column(exchange_rate_pairs::Column::Rate)
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        base: &str,
        targets: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<exchange_rate_pairs::Model>, RateError> {
        let rows = ExchangeRatePairs::find()
            .filter(exchange_rate_pairs::Column::BaseCurrency.eq(base))
            .filter(
                exchange_rate_pairs::Column::TargetCurrency
                    .is_in(targets.iter().map(String::as_str)),
            )
            .filter(exchange_rate_pairs::Column::Date.gte(start_date))
            .filter(exchange_rate_pairs::Column::Date.lte(end_date))
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store with the same conflict semantics as the database table
    #[derive(Default)]
    pub struct MemoryRateStore {
        pub rows: Mutex<Vec<NewRatePair>>,
        pub fail_upserts: bool,
    }

    impl MemoryRateStore {
        pub fn seeded(rows: Vec<NewRatePair>) -> Self {
            Self {
                rows: Mutex::new(rows),
                fail_upserts: false,
            }
        }

        pub fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn snapshot_rows(&self) -> Vec<NewRatePair> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateStore for MemoryRateStore {
        async fn upsert(&self, pairs: Vec<NewRatePair>) -> Result<(), RateError> {
            if self.fail_upserts {
                return Err(RateError::Store(sea_orm::DbErr::Custom(
                    "disk full".to_string(),
                )));
            }

            let mut rows = self.rows.lock().unwrap();
            for pair in pairs {
                if let Some(existing) = rows.iter_mut().find(|row| {
                    row.date == pair.date
                        && row.base_currency == pair.base_currency
                        && row.target_currency == pair.target_currency
                }) {
                    existing.rate = pair.rate;
                } else {
                    rows.push(pair);
                }
            }
            Ok(())
        }

        async fn query(
            &self,
            base: &str,
            targets: &[String],
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<Vec<exchange_rate_pairs::Model>, RateError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| {
                    row.base_currency == base
                        && targets.contains(&row.target_currency)
                        && row.date >= start_date
                        && row.date <= end_date
                })
                .enumerate()
                .map(|(i, row)| exchange_rate_pairs::Model {
                    id: i as i64 + 1,
                    date: row.date,
                    base_currency: row.base_currency.clone(),
                    target_currency: row.target_currency.clone(),
                    rate: row.rate,
                    created_at: None,
                })
                .collect())
        }
    }
}
