//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub http: HttpConfig,

    /// Shared secret required in the `X-API-Key` header.
    pub api_key: String,

    /// Per-listener rate limiting. Each listener builds its own independent
    /// window from these values.
    pub rate_limit: RateLimitConfig,

    /// Shutdown timeout tiers.
    pub shutdown: ShutdownConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (host part only).
    pub bind_address: String,

    /// Listening port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Fixed-window rate limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted operations per window.
    pub max_requests: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            window_ms: 60_000,
        }
    }
}

/// Two-tier shutdown timeouts. The process-level bound backstops both
/// listener drains and must be strictly greater than their sum.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// HTTP listener drain timeout in milliseconds.
    pub http_drain_ms: u64,

    /// Stream listener drain timeout in milliseconds.
    pub mcp_drain_ms: u64,

    /// Orchestrator-level hard timeout in milliseconds.
    pub process_ms: u64,
}

impl ShutdownConfig {
    pub fn http_drain(&self) -> Duration {
        Duration::from_millis(self.http_drain_ms)
    }

    pub fn mcp_drain(&self) -> Duration {
        Duration::from_millis(self.mcp_drain_ms)
    }

    pub fn process_bound(&self) -> Duration {
        Duration::from_millis(self.process_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            http_drain_ms: 10_000,
            mcp_drain_ms: 5_000,
            process_ms: 20_000,
        }
    }
}
