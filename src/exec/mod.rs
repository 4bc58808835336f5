//! Command execution collaborator.
//!
//! # Responsibilities
//! - Run a host command line and capture stdout/stderr/exit status
//! - Expose a trait seam so services can be tested with a mock executor
//!
//! # Design Decisions
//! - The executor never interprets output; trimming and newline-splitting
//!   happen in the services that know the command's shape
//! - No retries: a failed command surfaces to the caller exactly once
//! - A non-zero exit is a successful execution with a non-zero code; only a
//!   spawn failure is an `ExecError`

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;

/// Captured result of one command execution.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Failure to execute at all (the command never produced an exit status).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Executes a host command line.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> Result<CommandOutput, ExecError>;
}

/// Production executor: runs the command through the system shell.
pub struct ShellExecutor;

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutput, ExecError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // Terminated-by-signal has no exit code
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let out = ShellExecutor.execute("echo hello").await.unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.exit_code, 0);
        assert!(out.success());
    }

    #[tokio::test]
    async fn non_zero_exit_is_not_an_exec_error() {
        let out = ShellExecutor.execute("exit 3").await.unwrap();
        assert_eq!(out.exit_code, 3);
        assert!(!out.success());
    }
}
