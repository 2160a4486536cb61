//! Queuectl Core
//!
//! Core types and abstractions for the queuectl job queue.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Worker)
//! - DTOs: Structured inputs and summaries crossing the CLI/store boundary
//! - Retry policy: The pure backoff/DLQ decision function

pub mod domain;
pub mod dto;
pub mod retry;
