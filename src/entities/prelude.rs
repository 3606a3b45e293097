pub use super::exchange_rate_pairs::Entity as ExchangeRatePairs;
pub use super::user_transactions::Entity as UserTransactions;
