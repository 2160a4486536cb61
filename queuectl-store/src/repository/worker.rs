//! Worker Registry Repository
//!
//! Tracks live worker loops and their heartbeats. Rows exist only while a
//! loop runs; "active" is derived from heartbeat recency at query time.

use chrono::{Duration, Utc};
use queuectl_core::domain::worker::{ACTIVE_WINDOW_SECS, Worker};
use sqlx::SqlitePool;

use crate::db::{from_millis, to_millis};
use crate::error::Result;

/// Register a worker loop at startup
///
/// `pid` is the hosting OS process, kept for correlation; the returned
/// surrogate id is what heartbeats and unregistration key on.
pub async fn register(pool: &SqlitePool, pid: i64, name: &str) -> Result<Worker> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, WorkerRow>(
        r#"
        INSERT INTO workers (pid, name, last_heartbeat, started_at)
        VALUES (?1, ?2, ?3, ?3)
        RETURNING id, pid, name, last_heartbeat, started_at
        "#,
    )
    .bind(pid)
    .bind(name)
    .bind(to_millis(now))
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Refresh a worker's liveness timestamp
pub async fn heartbeat(pool: &SqlitePool, worker_id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE workers SET last_heartbeat = ?1 WHERE id = ?2")
        .bind(to_millis(Utc::now()))
        .bind(worker_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a worker's registration on loop exit
pub async fn unregister(pool: &SqlitePool, worker_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workers WHERE id = ?1")
        .bind(worker_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count workers whose heartbeat falls inside the liveness window
///
/// A crashed worker simply stops heartbeating and drops out of this count
/// once the window elapses; there is no explicit failure detection.
pub async fn active_count(pool: &SqlitePool) -> Result<i64> {
    let cutoff = Utc::now() - Duration::seconds(ACTIVE_WINDOW_SECS);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM workers WHERE last_heartbeat >= ?1")
            .bind(to_millis(cutoff))
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// List all registered workers
pub async fn list(pool: &SqlitePool) -> Result<Vec<Worker>> {
    let rows = sqlx::query_as::<_, WorkerRow>(
        "SELECT id, pid, name, last_heartbeat, started_at FROM workers ORDER BY started_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct WorkerRow {
    id: i64,
    pid: i64,
    name: Option<String>,
    last_heartbeat: i64,
    started_at: i64,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker {
            id: row.id,
            pid: row.pid,
            name: row.name.unwrap_or_default(),
            last_heartbeat: from_millis(row.last_heartbeat),
            started_at: from_millis(row.started_at),
        }
    }
}
