//! Status summary DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobState;

/// Per-state job counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JobCounts {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub dead: i64,
}

impl JobCounts {
    pub fn get(&self, state: JobState) -> i64 {
        match state {
            JobState::Pending => self.pending,
            JobState::Processing => self.processing,
            JobState::Completed => self.completed,
            JobState::Failed => self.failed,
            JobState::Dead => self.dead,
        }
    }

    pub fn set(&mut self, state: JobState, count: i64) {
        match state {
            JobState::Pending => self.pending = count,
            JobState::Processing => self.processing = count,
            JobState::Completed => self.completed = count,
            JobState::Failed => self.failed = count,
            JobState::Dead => self.dead = count,
        }
    }
}

/// Queue-wide status summary: job counts per state plus the number of
/// workers with a recent heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatus {
    pub jobs: JobCounts,
    pub active_workers: i64,
}
