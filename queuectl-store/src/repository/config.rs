//! Config Repository
//!
//! Generic key/value configuration behind a narrow typed interface.
//! Unset keys fall back to built-in defaults; values are re-read at use
//! time, so changing e.g. `backoff_base` affects future failures of jobs
//! that already exist.

use sqlx::SqlitePool;

use crate::error::{Result, StoreError};

/// Built-in defaults for the settings the core consumes
pub const DEFAULTS: &[(&str, &str)] = &[
    ("max_retries", "3"),
    ("backoff_base", "2"),
    ("worker_poll_interval", "1"),
    ("worker_heartbeat_interval", "2"),
];

fn default_for(key: &str) -> Option<&'static str> {
    DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Get a config value, falling back to the built-in default
///
/// `None` only for keys that are neither set nor defaulted.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM config WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row
        .map(|(value,)| value)
        .or_else(|| default_for(key).map(str::to_string)))
}

/// Set (upsert) a config value
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO config (key, value)
        VALUES (?1, ?2)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a config value parsed as an integer
pub async fn get_int(pool: &SqlitePool, key: &str) -> Result<Option<i64>> {
    match get(pool, key).await? {
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| bad_value(key, &value, "integer")),
        None => Ok(None),
    }
}

/// Get a config value parsed as a float
pub async fn get_float(pool: &SqlitePool, key: &str) -> Result<Option<f64>> {
    match get(pool, key).await? {
        Some(value) => value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| bad_value(key, &value, "number")),
        None => Ok(None),
    }
}

fn bad_value(key: &str, value: &str, expected: &str) -> StoreError {
    StoreError::Validation(format!(
        "config key '{key}' holds '{value}', which is not a valid {expected}"
    ))
}
