//! Worker execution loop
//!
//! One loop per worker. Each iteration: check the durable stop signal,
//! heartbeat, try to claim a job; sleep if none, otherwise execute it and
//! report the outcome. Neither a failing job nor a flaky store terminates
//! the loop; only the stop signal does.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use queuectl_core::domain::job::Job;
use queuectl_store::repository::{config_repository, control_repository, job_repository, worker_repository};
use sqlx::SqlitePool;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::executor::CommandExecutor;
use crate::settings::WorkerSettings;

/// Bounded retries for store writes inside the loop. After these the
/// transition is logged and the iteration abandoned, never silently dropped.
const STORE_WRITE_RETRIES: u32 = 3;
const STORE_RETRY_DELAY: Duration = Duration::from_millis(200);

/// A single worker's poll/execute loop
pub struct WorkerLoop {
    pool: SqlitePool,
    executor: Arc<dyn CommandExecutor>,
    settings: WorkerSettings,
    name: String,
}

impl WorkerLoop {
    pub fn new(
        pool: SqlitePool,
        executor: Arc<dyn CommandExecutor>,
        settings: WorkerSettings,
        name: impl Into<String>,
    ) -> Self {
        WorkerLoop {
            pool,
            executor,
            settings,
            name: name.into(),
        }
    }

    /// Runs the loop until the stop signal is observed
    ///
    /// Registers the worker up front and unregisters it on every exit path,
    /// including errors out of the loop body.
    pub async fn run(&self) -> Result<()> {
        let pid = i64::from(std::process::id());
        let worker = worker_repository::register(&self.pool, pid, &self.name).await?;
        info!(worker = %self.name, worker_id = worker.id, pid, "worker registered");

        let result = self.poll_loop(worker.id).await;

        if let Err(e) = worker_repository::unregister(&self.pool, worker.id).await {
            warn!(worker = %self.name, "failed to unregister: {e}");
        } else {
            info!(worker = %self.name, "worker unregistered");
        }

        result
    }

    async fn poll_loop(&self, worker_id: i64) -> Result<()> {
        let mut last_heartbeat: Option<Instant> = None;

        loop {
            match control_repository::stop_requested(&self.pool).await {
                Ok(true) => {
                    info!(worker = %self.name, "stop signal observed, exiting");
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => {
                    error!(worker = %self.name, "stop signal check failed: {e}");
                    sleep(self.settings.poll_interval).await;
                    continue;
                }
            }

            let heartbeat_due = last_heartbeat
                .is_none_or(|at| at.elapsed() >= self.settings.heartbeat_interval);
            if heartbeat_due {
                match worker_repository::heartbeat(&self.pool, worker_id).await {
                    Ok(_) => last_heartbeat = Some(Instant::now()),
                    Err(e) => warn!(worker = %self.name, "heartbeat failed: {e}"),
                }
            }

            let job = match job_repository::reserve(&self.pool).await {
                Ok(job) => job,
                Err(e) => {
                    error!(worker = %self.name, "reserve failed: {e}");
                    sleep(self.settings.poll_interval).await;
                    continue;
                }
            };

            match job {
                Some(job) => self.execute_and_report(job).await,
                None => {
                    debug!(worker = %self.name, "no job available");
                    sleep(self.settings.poll_interval).await;
                }
            }
        }
    }

    /// Executes one claimed job and writes the resulting transition
    async fn execute_and_report(&self, job: Job) {
        info!(worker = %self.name, job = %job.id, command = %job.command, "executing job");

        let outcome = self.executor.run(&job.command).await;

        if outcome.success {
            self.report_completed(&job).await;
        } else {
            let detail = outcome
                .detail
                .unwrap_or_else(|| "command failed".to_string());
            self.report_failed(&job, &detail).await;
        }
    }

    async fn report_completed(&self, job: &Job) {
        for attempt in 1..=STORE_WRITE_RETRIES {
            match job_repository::mark_completed(&self.pool, &job.id).await {
                Ok(_) => {
                    info!(worker = %self.name, job = %job.id, "job completed");
                    return;
                }
                Err(e) if attempt < STORE_WRITE_RETRIES => {
                    warn!(worker = %self.name, job = %job.id, "mark_completed failed (attempt {attempt}): {e}");
                    sleep(STORE_RETRY_DELAY).await;
                }
                Err(e) => {
                    error!(worker = %self.name, job = %job.id, "mark_completed abandoned after {STORE_WRITE_RETRIES} attempts: {e}");
                }
            }
        }
    }

    async fn report_failed(&self, job: &Job, detail: &str) {
        // backoff_base is resolved at failure time, not frozen at enqueue,
        // so tuning it affects future failures of existing jobs.
        let backoff_base = match config_repository::get_int(&self.pool, "backoff_base").await {
            Ok(value) => value.unwrap_or(2),
            Err(e) => {
                warn!(worker = %self.name, "could not read backoff_base, using 2: {e}");
                2
            }
        };

        for attempt in 1..=STORE_WRITE_RETRIES {
            match job_repository::mark_failed(
                &self.pool,
                &job.id,
                job.attempts,
                job.max_retries,
                detail,
                backoff_base,
            )
            .await
            {
                Ok(updated) => {
                    match updated {
                        Some(updated) if updated.is_dead() => {
                            warn!(
                                worker = %self.name,
                                job = %job.id,
                                attempts = updated.attempts,
                                "job moved to dead-letter queue: {detail}"
                            );
                        }
                        Some(updated) => {
                            info!(
                                worker = %self.name,
                                job = %job.id,
                                attempts = updated.attempts,
                                next_run_at = %updated.next_run_at,
                                "job failed, scheduled for retry: {detail}"
                            );
                        }
                        None => {
                            warn!(worker = %self.name, job = %job.id, "failed job vanished from store");
                        }
                    }
                    return;
                }
                Err(e) if attempt < STORE_WRITE_RETRIES => {
                    warn!(worker = %self.name, job = %job.id, "mark_failed failed (attempt {attempt}): {e}");
                    sleep(STORE_RETRY_DELAY).await;
                }
                Err(e) => {
                    error!(worker = %self.name, job = %job.id, "mark_failed abandoned after {STORE_WRITE_RETRIES} attempts: {e}");
                }
            }
        }
    }
}
