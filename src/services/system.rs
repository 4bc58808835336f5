//! Host status probes and systemd service management.

use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::exec::CommandExecutor;
use crate::services::command::CommandReport;

/// Formatted host status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub uptime: String,
    pub memory: String,
    pub disk: String,
    pub load: String,
}

pub struct SystemService {
    executor: Arc<dyn CommandExecutor>,
}

impl SystemService {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn fetch(&self, command: &str) -> Result<String, ApiError> {
        let output = self
            .executor
            .execute(command)
            .await
            .map_err(|e| ApiError::execution(e.to_string()))?;
        if !output.success() {
            return Err(ApiError::execution(format!(
                "`{command}` failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(output.stdout.trim().to_string())
    }

    pub async fn status(&self) -> Result<SystemStatus, ApiError> {
        Ok(SystemStatus {
            uptime: self.fetch("uptime -p").await?,
            memory: self.fetch("free -h").await?,
            disk: self.fetch("df -h").await?,
            load: self.fetch("uptime").await?,
        })
    }

    pub async fn manage_service(&self, name: &str, action: &str) -> Result<CommandReport, ApiError> {
        let output = self
            .executor
            .execute(&format!("systemctl {action} {name}"))
            .await
            .map_err(|e| ApiError::execution(e.to_string()))?;
        if !output.success() {
            return Err(ApiError::execution(format!(
                "systemctl {action} {name} failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(CommandReport {
            status: "success",
            output: output.stdout.trim().to_string(),
            error: String::new(),
            code: output.exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CommandOutput, ExecError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubExecutor {
        commands: Mutex<Vec<String>>,
        stdout: String,
        stderr: String,
        exit_code: i32,
    }

    impl StubExecutor {
        fn new(stdout: &str, stderr: &str, exit_code: i32) -> Arc<Self> {
            Arc::new(Self {
                commands: Mutex::new(Vec::new()),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code,
            })
        }
    }

    #[async_trait]
    impl CommandExecutor for StubExecutor {
        async fn execute(&self, command: &str) -> Result<CommandOutput, ExecError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(CommandOutput {
                stdout: self.stdout.clone(),
                stderr: self.stderr.clone(),
                exit_code: self.exit_code,
            })
        }
    }

    #[tokio::test]
    async fn manage_service_success_report_carries_the_exit_code() {
        // systemctl chatters on stderr even when it succeeds
        let executor = StubExecutor::new("", "Reloading.\n", 0);
        let service = SystemService::new(executor.clone());

        let report = service.manage_service("nginx", "restart").await.unwrap();
        assert_eq!(
            executor.commands.lock().unwrap()[0],
            "systemctl restart nginx"
        );
        assert_eq!(report.status, "success");
        assert_eq!(report.code, 0);
        assert!(report.error.is_empty());
    }

    #[tokio::test]
    async fn manage_service_failure_is_an_error() {
        let executor = StubExecutor::new("", "Unit missing.service not found.", 5);
        let service = SystemService::new(executor);

        let err = service.manage_service("missing", "start").await.unwrap_err();
        assert!(err.message().contains("not found"));
    }
}
