//! Core domain types
//!
//! This module contains the core domain structures shared across queuectl
//! components. Every process (CLI, worker fleet) reads and writes these
//! entities through the shared store.

pub mod job;
pub mod worker;
