//! SeaORM Entity for manually logged currency-exchange transactions

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity-provider user id, forwarded by the auth layer
    pub user_id: String,
    pub date: Date,
    pub base_currency: String,
    pub target_currency: String,
    pub base_amount: Decimal,
    pub target_amount: Decimal,
    pub exchange_rate: Decimal,
    /// "buy" or "sell", from the UI's perspective of the base currency
    pub transaction_type: String,
    pub description: Option<String>,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
