//! Command execution
//!
//! The store treats a job's command as opaque; this module is the seam where
//! it actually runs. Execution is a black box returning success or a
//! human-readable failure reason: exit codes, missing executables and spawn
//! errors all collapse into the same outcome shape, never into a crash.

use async_trait::async_trait;
use tokio::process::Command;

/// Result of running one job command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub success: bool,
    pub detail: Option<String>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        CommandOutcome {
            success: true,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        CommandOutcome {
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// Service trait for executing job commands
///
/// A trait seam so the execution loop can be tested with a stub executor.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs the command to completion; may block for arbitrary duration
    async fn run(&self, command: &str) -> CommandOutcome;
}

/// Executes commands through `sh -c`, inheriting stdio
pub struct ShellExecutor;

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &str) -> CommandOutcome {
        match Command::new("sh").arg("-c").arg(command).status().await {
            Ok(status) if status.success() => CommandOutcome::success(),
            Ok(status) => match status.code() {
                Some(code) => CommandOutcome::failed(format!("exit code {code}")),
                None => CommandOutcome::failed("terminated by signal"),
            },
            Err(e) => CommandOutcome::failed(format!("failed to spawn command: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_exit_is_success() {
        let outcome = ShellExecutor.run("true").await;
        assert!(outcome.success);
        assert!(outcome.detail.is_none());
    }

    #[tokio::test]
    async fn nonzero_exit_reports_the_code() {
        let outcome = ShellExecutor.run("exit 3").await;
        assert!(!outcome.success);
        assert_eq!(outcome.detail.as_deref(), Some("exit code 3"));
    }

    #[tokio::test]
    async fn missing_executable_is_a_failure_not_a_crash() {
        let outcome = ShellExecutor.run("definitely-not-a-real-binary-xyz").await;
        assert!(!outcome.success);
        assert!(outcome.detail.is_some());
    }
}
