//! Job Repository
//!
//! Handles all database operations related to jobs, including the atomic
//! claim primitive every worker races on.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use queuectl_core::domain::job::{Job, JobState};
use queuectl_core::dto::job::JobPayload;
use queuectl_core::dto::status::JobCounts;
use queuectl_core::retry;
use sqlx::SqlitePool;

use crate::db::{from_millis, to_millis};
use crate::error::{Result, StoreError};
use crate::repository::config;

/// `last_error` is truncated to this many bytes before being persisted.
const LAST_ERROR_MAX_BYTES: usize = 512;

const JOB_COLUMNS: &str =
    "id, command, state, attempts, max_retries, created_at, updated_at, next_run_at, last_error";

/// Create a new pending job from an enqueue payload
///
/// Applies defaults: generated id, `max_retries` from config (3 if unset),
/// timestamps = now, `next_run_at` = now. A caller-supplied id that already
/// exists fails with `Conflict`.
pub async fn enqueue(pool: &SqlitePool, payload: JobPayload) -> Result<Job> {
    if payload.command.trim().is_empty() {
        return Err(StoreError::Validation(
            "job payload must contain a non-empty 'command'".to_string(),
        ));
    }
    if payload.attempts < 0 {
        return Err(StoreError::Validation(
            "'attempts' must not be negative".to_string(),
        ));
    }

    let now = Utc::now();

    let max_retries = match payload.max_retries {
        Some(value) => value,
        None => config::get_int(pool, "max_retries").await?.unwrap_or(3),
    };
    if max_retries < 0 {
        return Err(StoreError::Validation(
            "'max_retries' must not be negative".to_string(),
        ));
    }

    let job = Job {
        id: payload.id.unwrap_or_else(|| generate_job_id(now)),
        command: payload.command,
        state: JobState::Pending,
        attempts: payload.attempts,
        max_retries,
        created_at: payload.created_at.unwrap_or(now),
        updated_at: payload.updated_at.unwrap_or(now),
        next_run_at: now,
        last_error: payload.last_error,
    };

    let insert = sqlx::query(
        r#"
        INSERT INTO jobs (id, command, state, attempts, max_retries, created_at, updated_at, next_run_at, last_error)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&job.id)
    .bind(&job.command)
    .bind(job.state.as_str())
    .bind(job.attempts)
    .bind(job.max_retries)
    .bind(to_millis(job.created_at))
    .bind(to_millis(job.updated_at))
    .bind(to_millis(job.next_run_at))
    .bind(&job.last_error)
    .execute(pool)
    .await;

    match insert {
        Ok(_) => Ok(job),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::Conflict(
            format!("a job with id '{}' already exists", job.id),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Atomically claim the oldest runnable job
///
/// Selects the single oldest job (by `created_at`) whose state is `pending`
/// or `failed` and whose `next_run_at` has passed, and flips it to
/// `processing`, all in one conditional UPDATE with RETURNING. SQLite
/// executes the statement atomically, so no two concurrent callers can ever
/// receive the same row; there is no separate read-then-write window.
///
/// Returns `Ok(None)` immediately when nothing is eligible.
pub async fn reserve(pool: &SqlitePool) -> Result<Option<Job>> {
    let now = to_millis(Utc::now());

    let row = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET state = 'processing',
            updated_at = ?1,
            next_run_at = ?1
        WHERE id = (
            SELECT id FROM jobs
            WHERE state IN ('pending', 'failed')
              AND next_run_at <= ?1
            ORDER BY created_at, id
            LIMIT 1
        )
        RETURNING id, command, state, attempts, max_retries, created_at, updated_at, next_run_at, last_error
        "#,
    )
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Transition a processing job to `completed`
///
/// Idempotent: repeat calls, unknown ids and jobs in any other state are
/// no-ops. Returns whether a row actually changed.
pub async fn mark_completed(pool: &SqlitePool, job_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET state = 'completed',
            updated_at = ?1
        WHERE id = ?2 AND state = 'processing'
        "#,
    )
    .bind(to_millis(Utc::now()))
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record a failed execution, applying the retry/backoff/DLQ policy
///
/// `attempts` and `max_retries` are the values the worker observed at claim
/// time; only the claim owner calls this, so no cross-process re-read is
/// needed. Returns the updated job, or `None` for an unknown id.
pub async fn mark_failed(
    pool: &SqlitePool,
    job_id: &str,
    attempts: i64,
    max_retries: i64,
    error: &str,
    backoff_base: i64,
) -> Result<Option<Job>> {
    let now = Utc::now();
    let outcome = retry::on_failure(attempts, max_retries, backoff_base, now);

    let row = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET state = ?1,
            attempts = ?2,
            updated_at = ?3,
            next_run_at = ?4,
            last_error = ?5
        WHERE id = ?6
        RETURNING id, command, state, attempts, max_retries, created_at, updated_at, next_run_at, last_error
        "#,
    )
    .bind(outcome.state.as_str())
    .bind(outcome.attempts)
    .bind(to_millis(now))
    .bind(to_millis(outcome.next_run_at))
    .bind(truncate_error(error))
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Send a dead-letter job back to `pending`
///
/// Resets attempts to 0, clears `last_error`, makes the job immediately
/// eligible. Only applies to jobs currently in `dead` state; anything else
/// (including unknown ids) reports `false` without erroring.
pub async fn retry_dead_job(pool: &SqlitePool, job_id: &str) -> Result<bool> {
    let now = to_millis(Utc::now());

    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET state = 'pending',
            attempts = 0,
            updated_at = ?1,
            next_run_at = ?1,
            last_error = NULL
        WHERE id = ?2 AND state = 'dead'
        "#,
    )
    .bind(now)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// List jobs ordered by creation time, optionally filtered by state
pub async fn list(pool: &SqlitePool, state: Option<JobState>) -> Result<Vec<Job>> {
    let rows = match state {
        Some(state) => {
            sqlx::query_as::<_, JobRow>(&format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE state = ?1 ORDER BY created_at, id"
            ))
            .bind(state.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, JobRow>(&format!(
                "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at, id"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Count jobs per state
pub async fn count_by_state(pool: &SqlitePool) -> Result<JobCounts> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT state, COUNT(*) FROM jobs GROUP BY state")
            .fetch_all(pool)
            .await?;

    let mut counts = JobCounts::default();
    for (state, count) in rows {
        if let Ok(state) = state.parse::<JobState>() {
            counts.set(state, count);
        }
    }

    Ok(counts)
}

// =============================================================================
// Helper Functions
// =============================================================================

static LAST_GENERATED_MS: AtomicI64 = AtomicI64::new(0);

/// Synthesizes a job id from the current time, strictly increasing within
/// this process even when several jobs are enqueued in the same millisecond.
fn generate_job_id(now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    loop {
        let last = LAST_GENERATED_MS.load(Ordering::Relaxed);
        if candidate <= last {
            candidate = last + 1;
        }
        if LAST_GENERATED_MS
            .compare_exchange(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            return format!("job-{candidate}");
        }
    }
}

fn truncate_error(msg: &str) -> String {
    if msg.len() <= LAST_ERROR_MAX_BYTES {
        return msg.to_string();
    }
    let mut end = LAST_ERROR_MAX_BYTES;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    msg[..end].to_string()
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    command: String,
    state: String,
    attempts: i64,
    max_retries: i64,
    created_at: i64,
    updated_at: i64,
    next_run_at: i64,
    last_error: Option<String>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        // Unknown states cannot appear through this crate's writers; fall
        // back to pending rather than failing the whole query.
        let state = row.state.parse().unwrap_or(JobState::Pending);

        Job {
            id: row.id,
            command: row.command,
            state,
            attempts: row.attempts,
            max_retries: row.max_retries,
            created_at: from_millis(row.created_at),
            updated_at: from_millis(row.updated_at),
            next_run_at: from_millis(row.next_run_at),
            last_error: row.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_strictly_increasing() {
        let now = Utc::now();
        let a = generate_job_id(now);
        let b = generate_job_id(now);
        let c = generate_job_id(now);
        assert!(a < b && b < c);
        assert!(a.starts_with("job-"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let msg = "é".repeat(400); // 800 bytes
        let truncated = truncate_error(&msg);
        assert!(truncated.len() <= LAST_ERROR_MAX_BYTES);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[test]
    fn short_errors_pass_through() {
        assert_eq!(truncate_error("exit code 1"), "exit code 1");
    }
}
