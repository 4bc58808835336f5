//! Stream listener subsystem.
//!
//! # Data Flow
//! ```text
//! stdin line → protocol.rs (JSON-RPC parse)
//!            → server.rs (admission, tracking, dispatch)
//!            → tools.rs (catalogue + tool handlers)
//!            → services → executor → stdout line
//! ```
//!
//! # Design Decisions
//! - One long-lived duplex channel; stdio in production, an in-memory duplex
//!   in tests
//! - The tool catalogue is static and enumerable; argument schemas are for
//!   client introspection, the server only shape-checks before dispatch

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpListener;
