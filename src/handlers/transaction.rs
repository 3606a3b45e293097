use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Set};

use crate::AppState;
use crate::entities::{prelude::*, user_transactions};
use crate::handlers::{bad_request, unauthorized};
use crate::models::ErrorResponse;
use crate::models::transaction::{
    CreateTransactionRequest, TransactionCreatedResponse, TransactionsQuery, TransactionsResponse,
};

/// The identity provider in front of the service resolves the session and
/// forwards the user id in this header
const USER_ID_HEADER: &str = "x-user-id";

fn require_user_id(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
        .ok_or_else(unauthorized)
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDate, (StatusCode, Json<ErrorResponse>)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| bad_request(&format!("Invalid {} format. Use YYYY-MM-DD", name)))
}

/// Handler for GET /api/transactions
pub async fn get_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = require_user_id(&headers)?;

    let mut finder = UserTransactions::find()
        .filter(user_transactions::Column::UserId.eq(&user_id))
        .order_by(user_transactions::Column::Date, Order::Desc);

    if let Some(start) = query.start_date.filter(|value| !value.is_empty()) {
        finder = finder.filter(user_transactions::Column::Date.gte(parse_date(&start, "startDate")?));
    }
    if let Some(end) = query.end_date.filter(|value| !value.is_empty()) {
        finder = finder.filter(user_transactions::Column::Date.lte(parse_date(&end, "endDate")?));
    }
    if let Some(base) = query.base_currency.filter(|value| !value.is_empty()) {
        finder = finder.filter(user_transactions::Column::BaseCurrency.eq(base.to_uppercase()));
    }
    if let Some(target) = query.target_currency.filter(|value| !value.is_empty()) {
        finder = finder.filter(user_transactions::Column::TargetCurrency.eq(target.to_uppercase()));
    }

    let transactions = finder.all(&state.db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    Ok(Json(TransactionsResponse { transactions }))
}

/// Handler for POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<Json<TransactionCreatedResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = require_user_id(&headers)?;

    let (
        Some(date),
        Some(base_currency),
        Some(target_currency),
        Some(base_amount),
        Some(target_amount),
        Some(exchange_rate),
        Some(transaction_type),
    ) = (
        body.date,
        body.base_currency,
        body.target_currency,
        body.base_amount,
        body.target_amount,
        body.exchange_rate,
        body.transaction_type,
    )
    else {
        return Err(bad_request("Missing required fields"));
    };

    let date = parse_date(&date, "date")?;

    if base_amount <= Decimal::ZERO || target_amount <= Decimal::ZERO || exchange_rate <= Decimal::ZERO
    {
        return Err(bad_request("Amounts and exchange rate must be positive"));
    }

    let new_transaction = user_transactions::ActiveModel {
        user_id: Set(user_id),
        date: Set(date),
        base_currency: Set(base_currency.to_uppercase()),
        target_currency: Set(target_currency.to_uppercase()),
        base_amount: Set(base_amount),
        target_amount: Set(target_amount),
        exchange_rate: Set(exchange_rate),
        transaction_type: Set(transaction_type),
        description: Set(body.description),
        ..Default::default()
    };

    let transaction = new_transaction.insert(&state.db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    Ok(Json(TransactionCreatedResponse { transaction }))
}
