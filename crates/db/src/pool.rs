//! SQLite connection pool.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::DbError;

/// Type alias for the shared pool used across the whole application.
pub type DbPool = SqlitePool;

/// Pool sizing and the bounds on how long an operation may wait, first for
/// a connection and then for the database write lock.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

/// Connection options shared by every pool.
///
/// Foreign-key enforcement is switched off: deleting a parent row must leave
/// its dependents in place with the stale id.
fn connect_options(
    database_url: &str,
    busy_timeout: Duration,
) -> Result<SqliteConnectOptions, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(false)
        .busy_timeout(busy_timeout);
    Ok(options)
}

/// Create a new connection pool from the given `database_url`.
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<DbPool, DbError> {
    info!(
        "Connecting to database (max_connections={}, acquire_timeout={:?})",
        config.max_connections, config.acquire_timeout
    );
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(connect_options(database_url, config.busy_timeout)?)
        .await?;
    Ok(pool)
}

/// Run embedded SQLx migrations located in `./migrations` (relative to the
/// workspace root at build time).
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("Running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// A migrated, private in-memory database.
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn connect_in_memory() -> Result<DbPool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options(
            "sqlite::memory:",
            PoolConfig::default().busy_timeout,
        )?)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Open a transaction that takes the write lock on its first statement.
///
/// A deferred transaction that reads before writing fails with `SQLITE_BUSY`
/// on the lock upgrade instead of waiting; this one waits on the busy timeout.
pub async fn begin_write(pool: &DbPool) -> Result<Transaction<'static, Sqlite>, DbError> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
