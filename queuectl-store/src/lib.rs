//! Queuectl Store
//!
//! The shared durable store every queuectl process coordinates through.
//! There is no other IPC: the CLI, the supervisor and every worker loop open
//! the same SQLite database, and correctness rests on each mutating
//! operation being a single atomic statement.
//!
//! Layout:
//! - `db`: pool construction and migrations
//! - `repository`: data access per entity (jobs, workers, config, control)
//! - `status`: queue-wide summary aggregation
//! - `error`: the store error taxonomy

pub mod db;
pub mod error;
pub mod repository;
pub mod status;

pub use error::{Result, StoreError};
