use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::user_transactions;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub base_currency: Option<String>,
    pub target_currency: Option<String>,
}

/// All fields optional so missing ones surface as a 400 with a clear message
/// instead of a body-rejection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub date: Option<String>, // YYYY-MM-DD format
    pub base_currency: Option<String>,
    pub target_currency: Option<String>,
    pub base_amount: Option<Decimal>,
    pub target_amount: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub transaction_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<user_transactions::Model>,
}

#[derive(Debug, Serialize)]
pub struct TransactionCreatedResponse {
    pub transaction: user_transactions::Model,
}
