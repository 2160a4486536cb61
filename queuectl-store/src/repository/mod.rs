//! Repository Module
//!
//! Data access layer for the shared store.
//! Each repository handles database operations for a specific table.

pub mod config;
pub mod control;
pub mod job;
pub mod worker;

// Re-export for convenience
pub use config as config_repository;
pub use control as control_repository;
pub use job as job_repository;
pub use worker as worker_repository;
