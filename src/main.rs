use chrono::Duration;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lilygem_backend::AppState;
use lilygem_backend::services::exchange_rate_api::ExchangeRateApiClient;
use lilygem_backend::services::live_rates::LiveRateCache;

const DEFAULT_API_BASE: &str = "https://v6.exchangerate-api.com/v6";
const LIVE_RATE_TTL_HOURS: i64 = 3;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lilygem_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let api_key = env::var("EXCHANGE_RATE_API_KEY").expect("EXCHANGE_RATE_API_KEY must be set");
    let api_base =
        env::var("EXCHANGE_RATE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    // Historical lookups need a paid provider plan; default to enabled
    let historical_enabled = env::var("EXCHANGE_RATE_API_HISTORICAL")
        .map(|value| value == "true" || value == "1")
        .unwrap_or(true);
    let cron_secret = env::var("CRON_SECRET").expect("CRON_SECRET must be set");
    let sync_base_currencies: Vec<String> = env::var("SYNC_BASE_CURRENCIES")
        .unwrap_or_else(|_| "USD,CAD".to_string())
        .split(',')
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect();

    let state = AppState {
        db,
        provider: ExchangeRateApiClient::new(api_key, api_base, historical_enabled),
        live_rates: Arc::new(LiveRateCache::new(Duration::hours(LIVE_RATE_TTL_HOURS))),
        cron_secret,
        sync_base_currencies,
    };

    // Build router
    let app = lilygem_backend::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
