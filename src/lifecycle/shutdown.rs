//! Shutdown coordination.
//!
//! A cancellation token shared by the signal handler, the listeners and the
//! orchestrator. The token counts triggers: the first one starts the graceful
//! sequence, the second escalates to an immediate exit. A separate fault flag
//! distinguishes fault-driven shutdown for the process exit code; the drain
//! behavior is identical either way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

struct Inner {
    triggers: watch::Sender<u32>,
    fault: AtomicBool,
}

/// Coordinator for graceful shutdown.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (triggers, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                triggers,
                fault: AtomicBool::new(false),
            }),
        }
    }

    /// Record one shutdown trigger and return the total so far.
    pub fn trigger(&self) -> u32 {
        let mut count = 0;
        self.inner.triggers.send_modify(|n| {
            *n += 1;
            count = *n;
        });
        count
    }

    /// Trigger shutdown because of an unrecoverable in-process fault.
    pub fn fault(&self) {
        self.inner.fault.store(true, Ordering::SeqCst);
        self.trigger();
    }

    pub fn is_fault(&self) -> bool {
        self.inner.fault.load(Ordering::SeqCst)
    }

    pub fn trigger_count(&self) -> u32 {
        *self.inner.triggers.borrow()
    }

    /// Resolve once the first trigger has been recorded.
    pub async fn triggered(&self) {
        self.wait_for(1).await;
    }

    /// Resolve once a second trigger demands escalation.
    pub async fn escalated(&self) {
        self.wait_for(2).await;
    }

    async fn wait_for(&self, threshold: u32) {
        let mut rx = self.inner.triggers.subscribe();
        while *rx.borrow_and_update() < threshold {
            if rx.changed().await.is_err() {
                // Sender lives inside self, so this cannot happen while the
                // caller still holds the coordinator.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
