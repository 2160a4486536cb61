//! Data Transfer Objects crossing the CLI/store boundary
//!
//! This module contains the structured enqueue payload and the status
//! summary. These are lightweight representations optimized for JSON input
//! and human-readable output, distinct from the persisted domain entities.

pub mod job;
pub mod status;
