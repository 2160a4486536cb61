//! Integration tests for the worker loop and supervisor
//!
//! A stub executor stands in for the shell so outcomes are deterministic and
//! fast; the store is a temp-file SQLite database as in production.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use queuectl_core::domain::job::JobState;
use queuectl_core::dto::job::JobPayload;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

use queuectl_store::repository::{
    config_repository, control_repository, job_repository, worker_repository,
};
use queuectl_store::db;
use queuectl_worker::{CommandExecutor, CommandOutcome, Supervisor, WorkerLoop, WorkerSettings};

async fn test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool = db::create_pool(dir.path().join("queue.db"))
        .await
        .expect("create pool");
    db::run_migrations(&pool).await.expect("run migrations");
    (pool, dir)
}

fn fast_settings() -> WorkerSettings {
    WorkerSettings {
        poll_interval: Duration::from_millis(20),
        heartbeat_interval: Duration::from_millis(20),
    }
}

/// Succeeds when the command is "ok", fails otherwise; records every call.
struct StubExecutor {
    calls: Mutex<Vec<String>>,
}

impl StubExecutor {
    fn new() -> Arc<Self> {
        Arc::new(StubExecutor {
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CommandExecutor for StubExecutor {
    async fn run(&self, command: &str) -> CommandOutcome {
        self.calls.lock().unwrap().push(command.to_string());
        if command == "ok" {
            CommandOutcome::success()
        } else {
            CommandOutcome::failed("exit code 1")
        }
    }
}

async fn wait_for_state(pool: &SqlitePool, state: JobState, want: usize) {
    timeout(Duration::from_secs(5), async {
        loop {
            let jobs = job_repository::list(pool, Some(state)).await.expect("list");
            if jobs.len() >= want {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {want} job(s) in state {state}"));
}

#[tokio::test]
async fn worker_completes_a_job_and_unregisters_on_stop() {
    let (pool, _dir) = test_pool().await;

    let mut payload = JobPayload::new("ok");
    payload.id = Some("job-ok".to_string());
    job_repository::enqueue(&pool, payload).await.expect("enqueue");

    let executor = StubExecutor::new();
    let worker = WorkerLoop::new(pool.clone(), executor.clone(), fast_settings(), "worker-1");
    let handle = tokio::spawn(async move { worker.run().await });

    wait_for_state(&pool, JobState::Completed, 1).await;
    assert_eq!(executor.calls.lock().unwrap().as_slice(), ["ok"]);

    control_repository::request_stop(&pool).await.expect("request stop");
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker loop should observe the stop signal")
        .expect("join")
        .expect("clean exit");

    let workers = worker_repository::list(&pool).await.expect("list workers");
    assert!(workers.is_empty(), "worker must unregister on exit");
}

#[tokio::test]
async fn failing_job_lands_in_dlq_and_loop_keeps_going() {
    let (pool, _dir) = test_pool().await;

    // Zero retry budget: the first failure goes straight to the DLQ.
    let mut failing = JobPayload::new("boom");
    failing.id = Some("job-boom".to_string());
    failing.max_retries = Some(0);
    failing.created_at = Some(chrono::Utc::now() - chrono::Duration::seconds(10));
    job_repository::enqueue(&pool, failing).await.expect("enqueue failing");

    let mut fine = JobPayload::new("ok");
    fine.id = Some("job-fine".to_string());
    job_repository::enqueue(&pool, fine).await.expect("enqueue fine");

    let executor = StubExecutor::new();
    let worker = WorkerLoop::new(pool.clone(), executor.clone(), fast_settings(), "worker-1");
    let handle = tokio::spawn(async move { worker.run().await });

    wait_for_state(&pool, JobState::Dead, 1).await;
    wait_for_state(&pool, JobState::Completed, 1).await;

    let dead = job_repository::list(&pool, Some(JobState::Dead)).await.expect("list");
    assert_eq!(dead[0].id, "job-boom");
    assert_eq!(dead[0].attempts, 1);
    assert_eq!(dead[0].last_error.as_deref(), Some("exit code 1"));

    control_repository::request_stop(&pool).await.expect("request stop");
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("stop observed")
        .expect("join")
        .expect("clean exit");
}

#[tokio::test]
async fn heartbeats_keep_the_worker_active() {
    let (pool, _dir) = test_pool().await;

    let executor = StubExecutor::new();
    let worker = WorkerLoop::new(pool.clone(), executor, fast_settings(), "worker-1");
    let handle = tokio::spawn(async move { worker.run().await });

    timeout(Duration::from_secs(5), async {
        while worker_repository::active_count(&pool).await.expect("count") < 1 {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("worker should register and heartbeat");

    control_repository::request_stop(&pool).await.expect("request stop");
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("stop observed")
        .expect("join")
        .expect("clean exit");

    assert_eq!(worker_repository::active_count(&pool).await.expect("count"), 0);
}

#[tokio::test]
async fn supervisor_drains_the_whole_fleet_on_stop() {
    let (pool, _dir) = test_pool().await;

    // Speed the fleet up; the supervisor loads these from config.
    config_repository::set(&pool, "worker_poll_interval", "0.02")
        .await
        .expect("set poll interval");
    config_repository::set(&pool, "worker_heartbeat_interval", "0.02")
        .await
        .expect("set heartbeat interval");

    // A stop left over from a previous run must not abort the new fleet.
    control_repository::request_stop(&pool).await.expect("stale stop");

    let supervisor = Supervisor::new(pool.clone());
    let foreground = {
        let pool = pool.clone();
        tokio::spawn(async move { Supervisor::new(pool).start_workers(3).await })
    };

    timeout(Duration::from_secs(5), async {
        while worker_repository::list(&pool).await.expect("list").len() < 3 {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("all three workers should register");

    supervisor.stop_workers().await.expect("stop");

    timeout(Duration::from_secs(5), foreground)
        .await
        .expect("fleet should drain")
        .expect("join")
        .expect("start_workers returns cleanly");

    assert!(worker_repository::list(&pool).await.expect("list").is_empty());
}

#[tokio::test]
async fn supervisor_rejects_zero_workers() {
    let (pool, _dir) = test_pool().await;
    assert!(Supervisor::new(pool).start_workers(0).await.is_err());
}
