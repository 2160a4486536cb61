//! Worker domain model
//!
//! Represents a live worker loop registered in the shared store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered worker loop
///
/// A row exists only while the loop is running: created at startup, refreshed
/// by heartbeats, deleted on exit. This is a liveness signal, not an audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Store-assigned surrogate key; heartbeats and unregistration key on this
    pub id: i64,

    /// OS process id of the hosting process, kept for correlation only
    pub pid: i64,

    /// Human-readable label, e.g. "worker-1"
    pub name: String,

    /// Last time this worker wrote a heartbeat
    pub last_heartbeat: DateTime<Utc>,

    /// When the worker loop started
    pub started_at: DateTime<Utc>,
}

/// Liveness window: a worker counts as active if its last heartbeat is at
/// most this many seconds old at query time.
pub const ACTIVE_WINDOW_SECS: i64 = 10;
