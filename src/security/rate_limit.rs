//! Fixed-window rate limiting.
//!
//! # Design Decisions
//! - Lazy window reset: a long idle period collapses into a single window
//!   regardless of how many window-lengths elapsed. Not a sliding window.
//! - No configuration errors at call time: a limit of 0 denies everything, a
//!   window of 0 resets on every call and effectively disables limiting.
//! - Deterministic given injected timestamps, so the window arithmetic is
//!   unit-testable without a clock.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied,
}

struct Window {
    /// Offset of the current window start, measured from the limiter's epoch.
    started: Duration,
    count: u32,
}

/// Fixed-window admission controller. One instance per listener.
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    epoch: Instant,
    state: Mutex<Window>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            epoch: Instant::now(),
            state: Mutex::new(Window {
                started: Duration::ZERO,
                count: 0,
            }),
        }
    }

    /// Check admission for one inbound operation.
    pub fn admit(&self) -> Admission {
        self.admit_at(self.epoch.elapsed())
    }

    /// Admission check against an explicit timestamp (offset from epoch).
    pub(crate) fn admit_at(&self, now: Duration) -> Admission {
        let mut window = self.state.lock().expect("rate limiter mutex poisoned");

        if now.saturating_sub(window.started) > self.window {
            window.count = 0;
            window.started = now;
        }

        window.count = window.count.saturating_add(1);
        if window.count <= self.limit {
            Admission::Allowed
        } else {
            Admission::Denied
        }
    }
}
