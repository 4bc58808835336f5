//! Journal log retrieval.

use std::sync::Arc;

use crate::error::ApiError;
use crate::exec::CommandExecutor;

pub struct LogService {
    executor: Arc<dyn CommandExecutor>,
}

impl LogService {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn journal(&self, command: &str) -> Result<Vec<String>, ApiError> {
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
        Ok(output
            .stdout
            .trim()
            .lines()
            .map(str::to_string)
            .collect())
    }

    pub async fn system_logs(&self) -> Result<Vec<String>, ApiError> {
        self.journal("journalctl -n 100").await
    }

    pub async fn unit_logs(&self, unit: &str) -> Result<Vec<String>, ApiError> {
        self.journal(&format!("journalctl -u {unit} -n 100")).await
    }
}
