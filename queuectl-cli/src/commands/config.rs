//! Config command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use queuectl_store::StoreError;
use queuectl_store::repository::config_repository;
use sqlx::SqlitePool;

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a config key
    Set { key: String, value: String },
    /// Get a config key (set value or built-in default)
    Get { key: String },
}

pub async fn handle_config_command(command: ConfigCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            config_repository::set(pool, &key, &value).await?;
            println!("{} = {}", key.bold(), value);
            Ok(())
        }
        ConfigCommands::Get { key } => match config_repository::get(pool, &key).await? {
            Some(value) => {
                println!("{} = {}", key.bold(), value);
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "config key '{key}' is not set and has no default"
            ))
            .into()),
        },
    }
}
