//! Process orchestration across both listeners.
//!
//! # Responsibilities
//! - Start both listeners concurrently; no partially-started state survives
//! - Hold the Running → ShuttingDown → Stopped state machine
//! - Enforce the orchestrator-level hard timeout around both listener drains
//! - Escalate to an immediate exit on a second shutdown trigger
//!
//! # Design Decisions
//! - The hard timeout is enforced independently of the listeners' own stop
//!   logic, so a listener whose timeout handling is itself stuck cannot hang
//!   the process
//! - Per-request failures never reach this layer; only startup errors,
//!   signals and out-of-request faults do

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::ShutdownConfig;
use crate::error::StartupError;
use crate::lifecycle::Shutdown;
use crate::security::DrainOutcome;

/// Forward-only lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Running,
    ShuttingDown,
    Stopped,
}

/// Why the orchestrator returned. Everything except `Clean` maps to a
/// non-zero process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Both listeners drained within their bounds after a signal.
    Clean,
    /// Shutdown was caused by an in-process fault.
    Fault,
    /// A second trigger arrived before the drain completed.
    Escalated,
    /// The orchestrator-level hard timeout fired.
    HardTimeout,
}

/// A transport front-end the orchestrator can start and stop.
pub trait Listener: Send + Sync {
    fn name(&self) -> &'static str;
    fn start(&self) -> impl Future<Output = Result<(), StartupError>> + Send;
    fn stop(&self, timeout: Duration) -> impl Future<Output = DrainOutcome> + Send;
}

/// Owns both listeners and drives startup/shutdown sequencing.
pub struct Orchestrator<H: Listener, M: Listener> {
    http: H,
    mcp: M,
    shutdown: Shutdown,
    timeouts: ShutdownConfig,
    state: Mutex<OrchestratorState>,
}

impl<H: Listener, M: Listener> Orchestrator<H, M> {
    pub fn new(http: H, mcp: M, shutdown: Shutdown, timeouts: ShutdownConfig) -> Self {
        Self {
            http,
            mcp,
            shutdown,
            timeouts,
            state: Mutex::new(OrchestratorState::Running),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.lock().expect("state mutex poisoned")
    }

    fn set_state(&self, state: OrchestratorState) {
        *self.state.lock().expect("state mutex poisoned") = state;
    }

    /// Run until shutdown completes. `Err` means startup failed; the caller
    /// exits non-zero and no listener is left running.
    pub async fn run(&self) -> Result<ExitReason, StartupError> {
        self.start_all().await?;
        tracing::info!("hostdock is running");

        self.shutdown.triggered().await;
        self.set_state(OrchestratorState::ShuttingDown);

        let reason = self.stop_all().await;
        self.set_state(OrchestratorState::Stopped);
        Ok(reason)
    }

    async fn start_all(&self) -> Result<(), StartupError> {
        match tokio::join!(self.http.start(), self.mcp.start()) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Ok(())) => {
                tracing::error!(listener = self.http.name(), error = %e, "startup failed");
                self.mcp.stop(Duration::ZERO).await;
                Err(e)
            }
            (Ok(()), Err(e)) => {
                tracing::error!(listener = self.mcp.name(), error = %e, "startup failed");
                self.http.stop(Duration::ZERO).await;
                Err(e)
            }
            (Err(e), Err(other)) => {
                tracing::error!(listener = self.mcp.name(), error = %other, "startup failed");
                tracing::error!(listener = self.http.name(), error = %e, "startup failed");
                Err(e)
            }
        }
    }

    async fn stop_all(&self) -> ExitReason {
        let drain = async {
            tokio::join!(
                self.http.stop(self.timeouts.http_drain()),
                self.mcp.stop(self.timeouts.mcp_drain()),
            )
        };

        tokio::select! {
            result = tokio::time::timeout(self.timeouts.process_bound(), drain) => {
                match result {
                    Ok((http_outcome, mcp_outcome)) => {
                        tracing::info!(?http_outcome, ?mcp_outcome, "hostdock stopped");
                        if self.shutdown.is_fault() {
                            ExitReason::Fault
                        } else {
                            ExitReason::Clean
                        }
                    }
                    Err(_) => {
                        tracing::warn!("shutdown exceeded the process-level bound, exiting");
                        ExitReason::HardTimeout
                    }
                }
            }
            _ = self.shutdown.escalated() => {
                tracing::warn!("shutdown escalated, skipping remaining drain");
                ExitReason::Escalated
            }
        }
    }
}
