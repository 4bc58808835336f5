//! OS signal handling.
//!
//! The handler does nothing but trigger the shutdown token; escalation and
//! drain sequencing live in the orchestrator. Handlers are installed once so
//! a rapid second signal cannot fall into a re-registration gap.

use crate::lifecycle::Shutdown;

/// Spawn the signal listener task.
pub fn spawn_signal_listener(shutdown: Shutdown) {
    tokio::spawn(run(shutdown));
}

#[cfg(unix)]
async fn run(shutdown: Shutdown) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
        note_trigger(&shutdown);
    }
}

#[cfg(not(unix))]
async fn run(shutdown: Shutdown) {
    loop {
        let _ = tokio::signal::ctrl_c().await;
        note_trigger(&shutdown);
    }
}

fn note_trigger(shutdown: &Shutdown) {
    if shutdown.trigger() == 1 {
        tracing::info!("termination signal received, shutting down");
    } else {
        tracing::warn!("repeated termination signal, escalating");
    }
}
