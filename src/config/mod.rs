//! Configuration subsystem.
//!
//! # Design Decisions
//! - One explicit `Config` struct constructed at startup and passed by
//!   injection; no global singleton
//! - Loaded once: TOML file (optional) then environment overrides
//! - Invalid or missing required configuration is fatal at startup

pub mod loader;
pub mod schema;

pub use loader::{load, ConfigError};
pub use schema::{Config, HttpConfig, RateLimitConfig, ShutdownConfig};
