//! Database pool and migrations

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

/// Opens (creating if necessary) the shared queue database.
///
/// WAL mode plus a busy timeout gives concurrent CLI/worker processes
/// bounded waits on the single writer instead of immediate lock errors.
pub async fn create_pool(path: impl AsRef<Path>) -> Result<SqlitePool, sqlx::Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Jobs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id          TEXT PRIMARY KEY,
            command     TEXT NOT NULL,
            state       TEXT NOT NULL,
            attempts    INTEGER NOT NULL,
            max_retries INTEGER NOT NULL,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL,
            next_run_at INTEGER NOT NULL,
            last_error  TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Workers table (liveness registry, not an audit log)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            pid            INTEGER NOT NULL,
            name           TEXT,
            last_heartbeat INTEGER NOT NULL,
            started_at     INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Key/value configuration consumed by workers and enqueue defaults
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS config (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Cross-process coordination signals (currently only the stop flag)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS control (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for claim eligibility scans and liveness queries
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_state_next_run ON jobs(state, next_run_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_workers_heartbeat ON workers(last_heartbeat)")
        .execute(pool)
        .await?;

    tracing::debug!("database migrations completed");
    Ok(())
}

/// Timestamps are persisted as Unix-epoch milliseconds so SQL comparisons
/// (`next_run_at <= now`, `ORDER BY created_at`) are plain integer order.
pub(crate) fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
