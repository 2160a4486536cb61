//! Queue-wide status aggregation

use queuectl_core::dto::status::QueueStatus;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::repository::{job_repository, worker_repository};

/// Job counts per state plus the number of workers with a heartbeat inside
/// the liveness window.
pub async fn get_status(pool: &SqlitePool) -> Result<QueueStatus> {
    let jobs = job_repository::count_by_state(pool).await?;
    let active_workers = worker_repository::active_count(pool).await?;

    Ok(QueueStatus {
        jobs,
        active_workers,
    })
}
