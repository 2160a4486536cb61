//! Control Repository
//!
//! Durable cross-process coordination signals. The only signal today is the
//! worker stop flag: a row any process can write and every worker loop polls
//! once per iteration. Cooperative, not preemptive: a worker mid-command
//! finishes that command before observing the flag.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::to_millis;
use crate::error::Result;

const STOP_KEY: &str = "workers.stop";

/// Ask all running worker loops (in any process) to exit after their
/// current job. The value records when the stop was requested.
pub async fn request_stop(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO control (key, value)
        VALUES (?1, ?2)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(STOP_KEY)
    .bind(to_millis(Utc::now()).to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Clear a pending stop signal; called before a new fleet starts
pub async fn clear_stop(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM control WHERE key = ?1")
        .bind(STOP_KEY)
        .execute(pool)
        .await?;

    Ok(())
}

/// Whether a stop has been requested
pub async fn stop_requested(pool: &SqlitePool) -> Result<bool> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM control WHERE key = ?1")
        .bind(STOP_KEY)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
