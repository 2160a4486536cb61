//! Dead-letter queue command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use queuectl_core::domain::job::JobState;
use queuectl_store::StoreError;
use queuectl_store::repository::job_repository;
use sqlx::SqlitePool;

/// DLQ subcommands
#[derive(Subcommand)]
pub enum DlqCommands {
    /// List jobs that exhausted their retry budget
    List,
    /// Send a dead job back to the queue with a fresh retry budget
    Retry {
        /// Job id to retry
        job_id: String,
    },
}

pub async fn handle_dlq_command(command: DlqCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        DlqCommands::List => list(pool).await,
        DlqCommands::Retry { job_id } => retry(pool, &job_id).await,
    }
}

async fn list(pool: &SqlitePool) -> Result<()> {
    let jobs = job_repository::list(pool, Some(JobState::Dead)).await?;

    if jobs.is_empty() {
        println!("{}", "Dead-letter queue is empty.".green());
        return Ok(());
    }

    for job in &jobs {
        println!(
            "{} | attempts={} | cmd={} | last_error={}",
            job.id.bold().red(),
            job.attempts,
            job.command,
            job.last_error.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

async fn retry(pool: &SqlitePool, job_id: &str) -> Result<()> {
    if job_repository::retry_dead_job(pool, job_id).await? {
        println!("Job {} sent back to the queue.", job_id.bold().green());
        Ok(())
    } else {
        Err(StoreError::NotFound(format!(
            "job '{job_id}' is not in the dead-letter queue; nothing changed"
        ))
        .into())
    }
}
