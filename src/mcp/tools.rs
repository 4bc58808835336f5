//! Tool catalogue and dispatch.
//!
//! The catalogue is declarative data consumed by clients for introspection;
//! dispatch only shape-checks the arguments it actually uses.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::docker::{ContainerSpec, DockerService};

/// Static tool catalogue exposed by `tools/list`.
pub fn catalogue() -> Value {
    json!([
        {
            "name": "containers_list",
            "description": "List all Docker containers",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "all": { "type": "boolean", "description": "Show all containers (including stopped ones)" }
                }
            }
        },
        {
            "name": "container_create",
            "description": "Create and start a new Docker container",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "image": { "type": "string", "description": "Docker image name" },
                    "name": { "type": "string", "description": "Container name" },
                    "ports": { "type": "array", "items": { "type": "string" }, "description": "Port mappings (e.g. [\"80:80\"])" },
                    "env": { "type": "array", "items": { "type": "string" }, "description": "Environment variables (e.g. [\"KEY=value\"])" }
                },
                "required": ["image"]
            }
        },
        {
            "name": "container_stop",
            "description": "Stop a running container",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "container": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["container"]
            }
        },
        {
            "name": "container_start",
            "description": "Start a stopped container",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "container": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["container"]
            }
        },
        {
            "name": "container_remove",
            "description": "Remove a container",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "container": { "type": "string", "description": "Container ID or name" },
                    "force": { "type": "boolean", "description": "Force remove running container" }
                },
                "required": ["container"]
            }
        },
        {
            "name": "container_logs",
            "description": "Get container logs",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "container": { "type": "string", "description": "Container ID or name" },
                    "tail": { "type": "number", "description": "Number of lines to show from the end" }
                },
                "required": ["container"]
            }
        },
        {
            "name": "container_exec",
            "description": "Execute a command in a running container",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "container": { "type": "string", "description": "Container ID or name" },
                    "command": { "type": "string", "description": "Command to execute" }
                },
                "required": ["container", "command"]
            }
        }
    ])
}

fn required_str<'a>(arguments: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    arguments
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request(format!("`{field}` is required")))
}

/// Run one named tool and render its text result.
pub async fn dispatch(
    docker: &DockerService,
    name: &str,
    arguments: &Value,
) -> Result<String, ApiError> {
    match name {
        "containers_list" => {
            let all = arguments.get("all").and_then(Value::as_bool).unwrap_or(false);
            docker.list_containers(all).await
        }
        "container_create" => {
            let spec: ContainerSpec = serde_json::from_value(arguments.clone())
                .map_err(|_| ApiError::bad_request("Invalid container parameters"))?;
            let output = docker.create_container(&spec).await?;
            Ok(format!("Container created: {}", output.trim()))
        }
        "container_stop" => {
            let container = required_str(arguments, "container")?;
            let output = docker.stop_container(container).await?;
            Ok(format!("Container stopped: {}", output.trim()))
        }
        "container_start" => {
            let container = required_str(arguments, "container")?;
            let output = docker.start_container(container).await?;
            Ok(format!("Container started: {}", output.trim()))
        }
        "container_remove" => {
            let container = required_str(arguments, "container")?;
            let force = arguments.get("force").and_then(Value::as_bool).unwrap_or(false);
            let output = docker.remove_container(container, force).await?;
            Ok(format!("Container removed: {}", output.trim()))
        }
        "container_logs" => {
            let container = required_str(arguments, "container")?;
            let tail = arguments.get("tail").and_then(Value::as_u64);
            docker.container_logs(container, tail).await
        }
        "container_exec" => {
            let container = required_str(arguments, "container")?;
            let command = required_str(arguments, "command")?;
            docker.exec_in_container(container, command).await
        }
        _ => Err(ApiError::method_not_found(name)),
    }
}
