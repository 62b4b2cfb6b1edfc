use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub mod generations;

pub async fn get_db_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database url: {}", database_url))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to {}", database_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run generations migrations")?;

    tracing::info!("Connected to {}", database_url);
    Ok(pool)
}

/// In-memory database for tests. A single connection that never expires,
/// since each SQLite connection gets its own `:memory:` database.
pub async fn get_test_db_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("To open an in-memory database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("To run migrations on the test database");

    pool
}
