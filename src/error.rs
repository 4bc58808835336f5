//! Error types shared across both listeners.
//!
//! # Design Decisions
//! - One tagged error type per request/invocation failure: a classification
//!   enum plus a human-readable message. Dispatch code checks the tag, never
//!   the message text.
//! - Startup failures get their own type; they are fatal and never flow
//!   through a response body.
//! - Per-request failures stop at the dispatch boundary. Only signals and
//!   out-of-request faults reach the orchestrator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Classification tag carried by every request-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    RateLimited,
    BadRequest,
    NotFound,
    MethodNotFound,
    /// External command exited non-zero or failed to spawn.
    Execution,
    /// Listener is draining; terminal unavailability, not back-pressure.
    ShuttingDown,
    Internal,
}

/// Request-level error: classification plus message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn rate_limited() -> Self {
        Self::new(
            ErrorKind::RateLimited,
            "Rate limit exceeded. Please try again later.",
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "Not found")
    }

    pub fn method_not_found(name: &str) -> Self {
        Self::new(ErrorKind::MethodNotFound, format!("Unknown tool: {name}"))
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Execution, message)
    }

    pub fn shutting_down() -> Self {
        Self::new(ErrorKind::ShuttingDown, "Server is shutting down")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound | ErrorKind::MethodNotFound => StatusCode::NOT_FOUND,
            ErrorKind::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Execution | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.message }));
        (status, body).into_response()
    }
}

/// Fatal listener startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("port {0} is already in use")]
    AddressInUse(u16),

    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_checked_by_tag() {
        let err = ApiError::execution("docker ps exited with status 1");
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(err.message(), "docker ps exited with status 1");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::unauthorized("Invalid API key").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::rate_limited().status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::shutting_down().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
