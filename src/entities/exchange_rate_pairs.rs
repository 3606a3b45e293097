//! SeaORM Entity for persisted daily exchange-rate pairs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exchange_rate_pairs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar day the rate applies to (no time component)
    pub date: Date,
    /// ISO 4217 currency code, e.g. "USD"
    pub base_currency: String,
    /// ISO 4217 currency code, never equal to base_currency
    pub target_currency: String,
    pub rate: Decimal,
    /// When the row was persisted
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
