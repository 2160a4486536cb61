//! Job command handlers
//!
//! Enqueue, listing and the status summary.

use anyhow::Result;
use colored::*;
use queuectl_core::domain::job::{Job, JobState};
use queuectl_core::dto::job::JobPayload;
use queuectl_store::repository::job_repository;
use queuectl_store::{StoreError, status};
use sqlx::SqlitePool;

/// Enqueue a job from an inline JSON string or `@file.json`
pub async fn enqueue(pool: &SqlitePool, input: &str) -> Result<()> {
    let raw = match input.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| StoreError::Validation(format!("cannot read payload file '{path}': {e}")))?,
        None => input.to_string(),
    };

    let payload = JobPayload::from_json(&raw)
        .map_err(|e| StoreError::Validation(format!("invalid job payload: {e}")))?;

    let job = job_repository::enqueue(pool, payload).await?;
    println!(
        "Enqueued job {} (state={})",
        job.id.bold(),
        colorize_state(job.state)
    );

    Ok(())
}

/// List jobs, optionally filtered by state
pub async fn list(pool: &SqlitePool, state: Option<JobState>, json: bool) -> Result<()> {
    let jobs = job_repository::list(pool, state).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        for job in &jobs {
            print_job_summary(job);
        }
    }

    Ok(())
}

/// Show job counts per state plus active workers
pub async fn status(pool: &SqlitePool, json: bool) -> Result<()> {
    let status = status::get_status(pool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Job counts:".bold());
    for state in JobState::ALL {
        println!(
            "  {:10} : {}",
            colorize_state(state),
            status.jobs.get(state)
        );
    }
    println!("{}", "Workers:".bold());
    println!("  {:10} : {}", "active", status.active_workers);

    Ok(())
}

fn print_job_summary(job: &Job) {
    println!(
        "{} | {:10} | attempts={} | max={} | cmd={}",
        job.id.bold(),
        colorize_state(job.state),
        job.attempts,
        job.max_retries,
        job.command
    );
}

fn colorize_state(state: JobState) -> ColoredString {
    match state {
        JobState::Pending => state.as_str().cyan(),
        JobState::Processing => state.as_str().blue(),
        JobState::Completed => state.as_str().green(),
        JobState::Failed => state.as_str().yellow(),
        JobState::Dead => state.as_str().red(),
    }
}
