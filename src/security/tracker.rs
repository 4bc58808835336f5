//! In-flight operation tracking.
//!
//! # Responsibilities
//! - Count operations currently executing on a listener
//! - Answer "quiescent yet?" during shutdown
//! - Wait for quiescence with a hard timeout
//!
//! # Design Decisions
//! - Pure cardinality primitive: never inspects operation payloads
//! - RAII guard deregisters on every exit path, including panics
//! - `drain` returns at the timeout boundary even when an operation never
//!   completes; shutdown must not hang on a stuck external process

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// How a drain attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// All in-flight operations completed within the timeout.
    Quiescent,
    /// The timeout elapsed with operations still in flight.
    TimedOut,
}

struct Inner {
    in_flight: AtomicUsize,
    changed: Notify,
}

/// Shared set of in-flight operation handles for one listener.
#[derive(Clone)]
pub struct RequestTracker {
    inner: Arc<Inner>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                in_flight: AtomicUsize::new(0),
                changed: Notify::new(),
            }),
        }
    }

    /// Register one operation. The returned guard deregisters it on drop.
    #[must_use = "dropping the guard immediately deregisters the operation"]
    pub fn track(&self) -> InFlightGuard {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn quiescent(&self) -> bool {
        self.in_flight() == 0
    }

    /// Wait until quiescent or until `timeout` elapses, whichever is first.
    pub async fn drain(&self, timeout: Duration) -> DrainOutcome {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // Arm the notification before checking, so a completion racing
            // with the check cannot be missed.
            let notified = self.inner.changed.notified();
            if self.quiescent() {
                return DrainOutcome::Quiescent;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return DrainOutcome::TimedOut;
            }
        }
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for one in-flight operation.
pub struct InFlightGuard {
    inner: Arc<Inner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.changed.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_drop_deregisters() {
        let tracker = RequestTracker::new();
        assert!(tracker.quiescent());

        let a = tracker.track();
        let b = tracker.track();
        assert_eq!(tracker.in_flight(), 2);

        drop(a);
        assert_eq!(tracker.in_flight(), 1);
        drop(b);
        assert!(tracker.quiescent());
    }

    #[tokio::test]
    async fn drain_returns_immediately_when_quiescent() {
        let tracker = RequestTracker::new();
        assert_eq!(
            tracker.drain(Duration::from_secs(5)).await,
            DrainOutcome::Quiescent
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drain_times_out_on_hung_operation() {
        let tracker = RequestTracker::new();
        let _hung = tracker.track();

        let started = tokio::time::Instant::now();
        let outcome = tracker.drain(Duration::from_millis(500)).await;

        assert_eq!(outcome, DrainOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn drain_observes_late_completion() {
        let tracker = RequestTracker::new();
        let guard = tracker.track();

        let drained = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.drain(Duration::from_millis(500)).await }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        drop(guard);

        assert_eq!(drained.await.unwrap(), DrainOutcome::Quiescent);
    }
}
