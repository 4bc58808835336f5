//! Docker command wrappers.
//!
//! Builds `docker …` command lines and returns trimmed stdout. A non-zero
//! exit becomes an `Execution`-classified error carrying the daemon's stderr.

use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::exec::CommandExecutor;

/// Container creation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSpec {
    pub image: String,
    pub name: Option<String>,
    pub ports: Option<Vec<String>>,
    pub env: Option<Vec<String>>,
}

pub struct DockerService {
    executor: Arc<dyn CommandExecutor>,
}

impl DockerService {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn docker(&self, args: &str) -> Result<String, ApiError> {
        let output = self
            .executor
            .execute(&format!("docker {args}"))
            .await
            .map_err(|e| ApiError::execution(format!("Docker command failed: {e}")))?;

        if !output.success() {
            return Err(ApiError::execution(format!(
                "Docker command failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    pub async fn list_containers(&self, all: bool) -> Result<String, ApiError> {
        let flag = if all { "-a " } else { "" };
        self.docker(&format!(
            "ps {flag}--format \"{{{{.ID}}}}\\t{{{{.Image}}}}\\t{{{{.Status}}}}\\t{{{{.Names}}}}\""
        ))
        .await
    }

    pub async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ApiError> {
        let mut cmd = String::from("run -d");
        if let Some(name) = &spec.name {
            cmd.push_str(&format!(" --name {name}"));
        }
        for port in spec.ports.iter().flatten() {
            cmd.push_str(&format!(" -p {port}"));
        }
        for var in spec.env.iter().flatten() {
            cmd.push_str(&format!(" -e {var}"));
        }
        cmd.push_str(&format!(" {}", spec.image));
        self.docker(&cmd).await
    }

    pub async fn stop_container(&self, id: &str) -> Result<String, ApiError> {
        self.docker(&format!("stop {id}")).await
    }

    pub async fn start_container(&self, id: &str) -> Result<String, ApiError> {
        self.docker(&format!("start {id}")).await
    }

    pub async fn remove_container(&self, id: &str, force: bool) -> Result<String, ApiError> {
        let flag = if force { "-f " } else { "" };
        self.docker(&format!("rm {flag}{id}")).await
    }

    pub async fn container_logs(&self, id: &str, tail: Option<u64>) -> Result<String, ApiError> {
        let tail = tail.map(|n| format!("--tail {n} ")).unwrap_or_default();
        self.docker(&format!("logs {tail}{id}")).await
    }

    pub async fn exec_in_container(&self, id: &str, command: &str) -> Result<String, ApiError> {
        self.docker(&format!("exec {id} {command}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::exec::{CommandOutput, ExecError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingExecutor {
        commands: Mutex<Vec<String>>,
        output: CommandOutput,
    }

    impl RecordingExecutor {
        fn returning(stdout: &str, exit_code: i32) -> Arc<Self> {
            Arc::new(Self {
                commands: Mutex::new(Vec::new()),
                output: CommandOutput {
                    stdout: stdout.to_string(),
                    stderr: if exit_code == 0 { String::new() } else { "boom".into() },
                    exit_code,
                },
            })
        }

        fn last_command(&self) -> String {
            self.commands.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn execute(&self, command: &str) -> Result<CommandOutput, ExecError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(self.output.clone())
        }
    }

    #[tokio::test]
    async fn create_builds_full_run_command() {
        let executor = RecordingExecutor::returning("abc123\n", 0);
        let docker = DockerService::new(executor.clone());

        let spec = ContainerSpec {
            image: "nginx:latest".into(),
            name: Some("web".into()),
            ports: Some(vec!["80:80".into(), "443:443".into()]),
            env: Some(vec!["MODE=prod".into()]),
        };
        let id = docker.create_container(&spec).await.unwrap();

        assert_eq!(id.trim(), "abc123");
        assert_eq!(
            executor.last_command(),
            "docker run -d --name web -p 80:80 -p 443:443 -e MODE=prod nginx:latest"
        );
    }

    #[tokio::test]
    async fn list_includes_all_flag() {
        let executor = RecordingExecutor::returning("", 0);
        let docker = DockerService::new(executor.clone());

        docker.list_containers(true).await.unwrap();
        assert!(executor.last_command().starts_with("docker ps -a --format"));

        docker.list_containers(false).await.unwrap();
        assert!(executor.last_command().starts_with("docker ps --format"));
    }

    #[tokio::test]
    async fn non_zero_exit_classifies_as_execution() {
        let executor = RecordingExecutor::returning("", 1);
        let docker = DockerService::new(executor);

        let err = docker.stop_container("deadbeef").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.message().contains("boom"));
    }
}
