//! Worker settings
//!
//! Interval tuning for the execution loop, snapshotted from the shared
//! config table at fleet startup. `max_retries` and `backoff_base` are
//! deliberately not part of this snapshot: they are re-read at enqueue and
//! failure time respectively, so config changes affect existing jobs.

use std::time::Duration;

use anyhow::Result;
use queuectl_store::repository::config_repository;
use sqlx::SqlitePool;

/// Execution loop intervals
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// How long to sleep when no job is claimable
    pub poll_interval: Duration,

    /// Minimum spacing between heartbeat writes
    pub heartbeat_interval: Duration,
}

impl WorkerSettings {
    /// Loads interval settings from the config table
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let poll = config_repository::get_float(pool, "worker_poll_interval")
            .await?
            .unwrap_or(1.0);
        let heartbeat = config_repository::get_float(pool, "worker_heartbeat_interval")
            .await?
            .unwrap_or(2.0);

        let settings = WorkerSettings {
            poll_interval: Duration::from_secs_f64(poll.max(0.0)),
            heartbeat_interval: Duration::from_secs_f64(heartbeat.max(0.0)),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("worker_poll_interval must be greater than 0");
        }
        Ok(())
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            poll_interval: Duration::from_secs(1),
            heartbeat_interval: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = WorkerSettings::default();
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.heartbeat_interval, Duration::from_secs(2));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let settings = WorkerSettings {
            poll_interval: Duration::ZERO,
            heartbeat_interval: Duration::from_secs(2),
        };
        assert!(settings.validate().is_err());
    }
}
