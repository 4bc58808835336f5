//! HTTP listener subsystem.
//!
//! # Data Flow
//! ```text
//! Request → CORS pre-flight → open probes (/health, /, /api)
//!         → middleware.rs (API key, then rate limit)
//!         → handlers.rs (route table dispatch)
//!         → services → executor → JSON response
//! ```
//!
//! # Design Decisions
//! - Precedence is encoded in router structure: probe routes sit outside the
//!   authenticated nest, so they skip both auth and admission
//! - Every request is tracked with an RAII guard for shutdown drains

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{AppState, HttpListener};
