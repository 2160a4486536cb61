//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod config;
mod dlq;
mod job;
mod worker;

pub use config::ConfigCommands;
pub use dlq::DlqCommands;
pub use worker::WorkerCommands;

use anyhow::Result;
use clap::Subcommand;
use queuectl_core::domain::job::JobState;
use sqlx::SqlitePool;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Enqueue a new job from JSON
    Enqueue {
        /// Job JSON string or @/path/to/file.json
        payload: String,
    },
    /// List jobs
    List {
        /// Filter jobs by state
        #[arg(long)]
        state: Option<JobState>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show job & worker status summary
    Status {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Dead-letter queue operations
    Dlq {
        #[command(subcommand)]
        command: DlqCommands,
    },
    /// Worker management
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
    /// Config management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, pool: &SqlitePool) -> Result<()> {
    match command {
        Commands::Enqueue { payload } => job::enqueue(pool, &payload).await,
        Commands::List { state, json } => job::list(pool, state, json).await,
        Commands::Status { json } => job::status(pool, json).await,
        Commands::Dlq { command } => dlq::handle_dlq_command(command, pool).await,
        Commands::Worker { command } => worker::handle_worker_command(command, pool).await,
        Commands::Config { command } => config::handle_config_command(command, pool).await,
    }
}
