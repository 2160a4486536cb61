//! Queuectl Worker
//!
//! The worker fleet: per-worker execution loops that poll the shared store
//! for runnable jobs, execute their shell commands, and report outcomes;
//! plus the supervisor that starts N loops and coordinates cooperative
//! shutdown through the store's durable stop signal.
//!
//! Workers hold no shared in-memory state. Each loop owns a pool handle and
//! an executor; all coordination is store-mediated.

pub mod executor;
pub mod settings;
pub mod supervisor;
pub mod worker_loop;

pub use executor::{CommandExecutor, CommandOutcome, ShellExecutor};
pub use settings::WorkerSettings;
pub use supervisor::Supervisor;
pub use worker_loop::WorkerLoop;
