//! Route handlers.
//!
//! Body-bearing routes take the raw buffered bytes and parse explicitly, so a
//! malformed payload is a 400 that never reaches the executor.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::server::AppState;
use crate::services::auth::{LoginRequest, RegisterRequest};
use crate::services::docker::ContainerSpec;

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid request body"))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

pub async fn service_status() -> Json<Value> {
    Json(json!({ "status": "running" }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub all: bool,
}

pub async fn list_containers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let output = state.docker.list_containers(query.all).await?;
    let containers: Vec<&str> = output.trim().lines().collect();
    Ok(Json(json!({ "containers": containers })))
}

pub async fn create_container(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let spec: ContainerSpec = parse_body(&body)?;
    let output = state.docker.create_container(&spec).await?;
    Ok(Json(json!({ "containerId": output.trim() })))
}

#[derive(Deserialize)]
struct CommandRequest {
    command: String,
}

pub async fn run_command(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: CommandRequest = parse_body(&body)?;
    let report = state.command.run(&request.command).await;
    Ok(Json(serde_json::to_value(report).map_err(|e| ApiError::internal(e.to_string()))?))
}

pub async fn system_status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let status = state.system.status().await?;
    Ok(Json(serde_json::to_value(status).map_err(|e| ApiError::internal(e.to_string()))?))
}

#[derive(Deserialize)]
struct ServiceRequest {
    name: String,
    action: String,
}

pub async fn manage_service(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: ServiceRequest = parse_body(&body)?;
    let report = state
        .system
        .manage_service(&request.name, &request.action)
        .await?;
    Ok(Json(serde_json::to_value(report).map_err(|e| ApiError::internal(e.to_string()))?))
}

#[derive(Deserialize)]
pub struct LogsQuery {
    pub unit: Option<String>,
}

pub async fn fetch_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let lines = match &query.unit {
        Some(unit) => state.logs.unit_logs(unit).await?,
        None => state.logs.system_logs().await?,
    };
    Ok(Json(json!({ "logs": lines })))
}

pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: RegisterRequest = parse_body(&body)?;
    let token = state.auth.register(&request)?;
    Ok(Json(json!({ "token": token })))
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request: LoginRequest = parse_body(&body)?;
    let token = state.auth.login(&request)?;
    Ok(Json(json!({ "token": token })))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
