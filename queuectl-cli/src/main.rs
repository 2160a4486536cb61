//! Queuectl CLI
//!
//! Command-line interface for the background job queue: enqueue jobs,
//! inspect the queue and the dead-letter queue, and manage the worker fleet.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use queuectl_store::{StoreError, db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "queuectl")]
#[command(
    about = "CLI-based background job queue with workers, retries, and a dead-letter queue",
    long_about = None
)]
struct Cli {
    /// Path to the shared queue database
    #[arg(long, env = "QUEUECTL_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queuectl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let db_path = cli.db_path.unwrap_or_else(default_db_path);

    if let Err(err) = run(&db_path, cli.command).await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(exit_code(&err));
    }
}

async fn run(db_path: &PathBuf, command: Commands) -> Result<()> {
    let pool = db::create_pool(db_path).await?;
    db::run_migrations(&pool).await?;
    handle_command(command, &pool).await
}

fn default_db_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".queuectl").join("queue.db"),
        None => PathBuf::from("queue.db"),
    }
}

/// Validation/conflict/not-found exit 2, store/transport failures exit 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StoreError>() {
        Some(e) if e.is_usage_error() => 2,
        _ => 1,
    }
}
