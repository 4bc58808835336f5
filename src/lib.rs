//! hostdock: container and host management daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                   ORCHESTRATOR                   │
//!                 │        startup join · shutdown state machine     │
//!                 │        two-tier timeouts · signal escalation     │
//!                 └───────────┬──────────────────────┬───────────────┘
//!                             │                      │
//!   HTTP clients ────────▶ ┌──▼───────┐          ┌───▼──────┐ ◀──── stdio peer
//!                          │   http   │          │   mcp    │
//!                          │ listener │          │ listener │
//!                          └──┬───────┘          └───┬──────┘
//!                             │  auth · rate limit · │  tool table
//!                             │  tracking            │  rate limit · tracking
//!                             └──────────┬───────────┘
//!                                        ▼
//!                              ┌───────────────────┐
//!                              │     services      │
//!                              │ docker · system · │
//!                              │ logs · auth · cmd │
//!                              └────────┬──────────┘
//!                                       ▼
//!                              ┌───────────────────┐
//!                              │ command executor  │──▶ host processes
//!                              └───────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod http;
pub mod lifecycle;
pub mod mcp;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{ApiError, ErrorKind, StartupError};
pub use http::HttpListener;
pub use lifecycle::{ExitReason, Listener, Orchestrator, Shutdown};
pub use mcp::McpListener;
pub use security::{DrainOutcome, FixedWindowLimiter, RequestTracker};
