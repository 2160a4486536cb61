//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single unit of work in the queue
///
/// Structure shared between the CLI (enqueues, inspects) and workers
/// (claim, execute, report). The `command` field is opaque to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub command: String,
    pub state: JobState,
    pub attempts: i64,
    pub max_retries: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub next_run_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

impl Job {
    /// Whether the job sits in the dead-letter queue
    pub fn is_dead(&self) -> bool {
        self.state == JobState::Dead
    }
}

/// Job lifecycle state
///
/// Transitions:
/// - `Pending`/`Failed` --reserve--> `Processing`
/// - `Processing` --mark_completed--> `Completed` (terminal)
/// - `Processing` --mark_failed--> `Failed` or `Dead`
/// - `Dead` --retry_dead_job--> `Pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Dead,
}

impl JobState {
    /// All states, in the order status summaries display them
    pub const ALL: [JobState; 5] = [
        JobState::Pending,
        JobState::Processing,
        JobState::Completed,
        JobState::Failed,
        JobState::Dead,
    ];

    /// Stable string form used in the database and on the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Dead => "dead",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            "dead" => Ok(JobState::Dead),
            other => Err(format!(
                "unknown job state '{other}' (expected pending, processing, completed, failed or dead)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn state_round_trips_through_str() {
        for state in JobState::ALL {
            assert_eq!(JobState::from_str(state.as_str()), Ok(state));
        }
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!(JobState::from_str("queued").is_err());
    }
}
