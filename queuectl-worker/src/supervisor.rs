//! Worker supervisor
//!
//! Starts a fleet of execution loops and coordinates cooperative shutdown.
//! The stop signal lives in the store, so `stop_workers` reaches loops
//! started by any process, and a Ctrl-C during the foreground wait turns
//! into the same graceful stop.

use std::sync::Arc;

use anyhow::Result;
use queuectl_store::repository::control_repository;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::executor::{CommandExecutor, ShellExecutor};
use crate::settings::WorkerSettings;
use crate::worker_loop::WorkerLoop;

/// Starts and stops worker fleets against one shared store
pub struct Supervisor {
    pool: SqlitePool,
}

impl Supervisor {
    pub fn new(pool: SqlitePool) -> Self {
        Supervisor { pool }
    }

    /// Spawns `count` worker loops and blocks until all of them exit
    ///
    /// Clears any stop signal left over from a previous shutdown first.
    /// An interrupt during the wait requests a stop and then still drains
    /// every loop; workers finish their current job before exiting.
    pub async fn start_workers(&self, count: usize) -> Result<()> {
        anyhow::ensure!(count > 0, "worker count must be at least 1");

        control_repository::clear_stop(&self.pool).await?;
        let settings = WorkerSettings::load(&self.pool).await?;
        let executor: Arc<dyn CommandExecutor> = Arc::new(ShellExecutor);

        let mut handles = Vec::with_capacity(count);
        for i in 1..=count {
            let worker = WorkerLoop::new(
                self.pool.clone(),
                Arc::clone(&executor),
                settings.clone(),
                format!("worker-{i}"),
            );
            handles.push(tokio::spawn(async move {
                if let Err(e) = worker.run().await {
                    error!("worker exited with error: {e:#}");
                }
            }));
        }

        info!("started {count} worker(s), running in foreground");

        let drain = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!("worker task panicked: {e}");
                }
            }
        };
        tokio::pin!(drain);

        tokio::select! {
            _ = &mut drain => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping workers gracefully");
                self.stop_workers().await?;
                drain.await;
            }
        }

        info!("all workers exited");
        Ok(())
    }

    /// Sets the durable stop signal for every running loop, in any process
    pub async fn stop_workers(&self) -> Result<()> {
        control_repository::request_stop(&self.pool).await?;
        Ok(())
    }
}
