//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (orchestrator.rs):
//!     Both listeners start concurrently → join → "running"
//!     Either fails → tear down the other → exit non-zero
//!
//! Shutdown (shutdown.rs, orchestrator.rs):
//!     Signal or fault → trigger token → both listeners stop concurrently
//!     → each drains against its own timeout → orchestrator hard timeout
//!     Second signal → immediate non-graceful exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger the shutdown token, nothing else
//! ```

pub mod orchestrator;
pub mod shutdown;
pub mod signals;

pub use orchestrator::{ExitReason, Listener, Orchestrator, OrchestratorState};
pub use shutdown::Shutdown;
