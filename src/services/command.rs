//! Generic host command execution.
//!
//! Unlike the Docker wrapper, a failed command here is not an error response:
//! the report embeds the failure so API clients always get the full
//! stdout/stderr/exit triple.

use serde::Serialize;
use std::sync::Arc;

use crate::exec::CommandExecutor;

/// Outcome of a generic command run, as returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub status: &'static str,
    pub output: String,
    pub error: String,
    pub code: i32,
}

pub struct CommandService {
    executor: Arc<dyn CommandExecutor>,
}

impl CommandService {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    pub async fn run(&self, command: &str) -> CommandReport {
        match self.executor.execute(command).await {
            Ok(output) if output.success() => CommandReport {
                status: "success",
                output: output.stdout.trim().to_string(),
                error: output.stderr.trim().to_string(),
                code: 0,
            },
            Ok(output) => CommandReport {
                status: "error",
                output: output.stdout.trim().to_string(),
                error: output.stderr.trim().to_string(),
                code: output.exit_code,
            },
            Err(e) => CommandReport {
                status: "error",
                output: String::new(),
                error: e.to_string(),
                code: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ShellExecutor;

    #[tokio::test]
    async fn reports_success_with_trimmed_output() {
        let service = CommandService::new(Arc::new(ShellExecutor));
        let report = service.run("echo hostdock").await;
        assert_eq!(report.status, "success");
        assert_eq!(report.output, "hostdock");
        assert_eq!(report.code, 0);
    }

    #[tokio::test]
    async fn reports_failure_without_erroring() {
        let service = CommandService::new(Arc::new(ShellExecutor));
        let report = service.run("exit 7").await;
        assert_eq!(report.status, "error");
        assert_eq!(report.code, 7);
    }
}
