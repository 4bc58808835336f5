//! Request middleware: in-flight tracking, API key auth, rate limiting.
//!
//! Layer order matters: tracking wraps everything, auth runs before the
//! admission check so an unauthenticated caller cannot consume window budget.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::http::server::AppState;
use crate::security::Admission;

/// Register the request in the listener's in-flight set for the full span of
/// its handling. The guard deregisters on every exit path.
pub async fn track_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let _guard = state.tracker.track();
    next.run(request).await
}

/// Shared-secret check via the `X-API-Key` header.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if key == state.api_key.as_ref() => Ok(next.run(request).await),
        _ => Err(ApiError::unauthorized("Invalid API key")),
    }
}

/// Fixed-window admission check.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match state.limiter.admit() {
        Admission::Allowed => Ok(next.run(request).await),
        Admission::Denied => {
            tracing::warn!(path = %request.uri().path(), "rate limit exceeded");
            Err(ApiError::rate_limited())
        }
    }
}
