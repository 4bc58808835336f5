//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound operation:
//!     → rate_limit.rs (fixed-window admission check)
//!     → tracker.rs (register in-flight, RAII deregister)
//!     → Pass to dispatch
//!
//! Shutdown:
//!     → tracker.rs drain(timeout) per listener
//! ```
//!
//! # Design Decisions
//! - One limiter and one tracker instance per listener; isolation between the
//!   two listeners is intentional
//! - Both components are pure counting primitives and never inspect payloads

pub mod rate_limit;
pub mod tracker;

pub use rate_limit::{Admission, FixedWindowLimiter};
pub use tracker::{DrainOutcome, InFlightGuard, RequestTracker};
