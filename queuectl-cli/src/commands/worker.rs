//! Worker fleet command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use queuectl_worker::Supervisor;
use sqlx::SqlitePool;

/// Worker subcommands
#[derive(Subcommand)]
pub enum WorkerCommands {
    /// Start one or more workers in the foreground
    Start {
        /// Number of workers to start
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Stop running workers gracefully (across all processes)
    Stop,
}

pub async fn handle_worker_command(command: WorkerCommands, pool: &SqlitePool) -> Result<()> {
    let supervisor = Supervisor::new(pool.clone());

    match command {
        WorkerCommands::Start { count } => supervisor.start_workers(count).await,
        WorkerCommands::Stop => {
            supervisor.stop_workers().await?;
            println!("{}", "Signalled workers to stop gracefully.".green());
            Ok(())
        }
    }
}
