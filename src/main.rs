//! Atheneum bootstrap binary.
//!
//! Initialises the lending database: opens the pool, runs migrations,
//! ensures the default administrator exists and (with `--seed-demo`)
//! populates an empty catalog with demo data.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atheneum::{config::AppConfig, repository::Repository, seed, services::Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("atheneum={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Atheneum v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_with(options)
        .await?;

    tracing::info!(url = %config.database.url, "connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations completed");

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.lending.clone());

    seed::ensure_default_admin(&services).await?;

    if std::env::args().any(|arg| arg == "--seed-demo") {
        seed::seed_demo_data(&services).await?;
    }

    let stats = services.stats.dashboard().await?;
    tracing::info!(
        books = stats.total_books,
        members = stats.total_members,
        categories = stats.total_categories,
        active_loans = stats.active_loans,
        overdue_loans = stats.overdue_loans,
        "catalog ready"
    );

    Ok(())
}
