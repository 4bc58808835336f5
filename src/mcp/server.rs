//! Stream listener lifecycle and dispatch.
//!
//! # Responsibilities
//! - Serve JSON-RPC over one long-lived duplex channel
//! - Admission-check and track every tool invocation
//! - Drain against a timeout on stop, then release the channel
//!
//! # Design Decisions
//! - Invocations run as spawned tasks so a slow external command never
//!   blocks the read loop
//! - A second concurrent `stop()` observes the same in-progress drain rather
//!   than starting another one
//! - Once shutting down, admission denies with a distinct reason so callers
//!   can tell terminal unavailability from back-pressure

use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch, OnceCell};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{ApiError, StartupError};
use crate::exec::CommandExecutor;
use crate::mcp::protocol::{self, Request, Response, ToolCallParams};
use crate::mcp::tools;
use crate::security::{Admission, DrainOutcome, FixedWindowLimiter, RequestTracker};
use crate::services::DockerService;

/// Extra time granted for the session loop to notice the channel closing.
const SHUTDOWN_CLEANUP: Duration = Duration::from_secs(1);

/// Everything one session needs, cloneable into the session task.
#[derive(Clone)]
struct SessionCore {
    docker: Arc<DockerService>,
    limiter: Arc<FixedWindowLimiter>,
    tracker: RequestTracker,
    shutting_down: Arc<AtomicBool>,
    closed: watch::Receiver<bool>,
}

/// Tool front-end over a single duplex stream.
pub struct McpListener {
    core: SessionCore,
    tracker: RequestTracker,
    shutting_down: Arc<AtomicBool>,
    closed: watch::Sender<bool>,
    session: Mutex<Option<JoinHandle<()>>>,
    stopped: OnceCell<DrainOutcome>,
}

impl McpListener {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &Config) -> Self {
        let tracker = RequestTracker::new();
        let shutting_down = Arc::new(AtomicBool::new(false));
        let (closed, closed_rx) = watch::channel(false);

        Self {
            core: SessionCore {
                docker: Arc::new(DockerService::new(executor)),
                limiter: Arc::new(FixedWindowLimiter::new(
                    config.rate_limit.max_requests,
                    config.rate_limit.window(),
                )),
                tracker: tracker.clone(),
                shutting_down: shutting_down.clone(),
                closed: closed_rx,
            },
            tracker,
            shutting_down,
            closed,
            session: Mutex::new(None),
            stopped: OnceCell::new(),
        }
    }

    /// Begin serving on stdio.
    pub async fn start(&self) -> Result<(), StartupError> {
        self.attach(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
        tracing::info!("MCP server running on stdio");
        Ok(())
    }

    /// Serve a session over an arbitrary duplex transport.
    pub fn attach<R, W>(&self, reader: R, writer: W)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let core = self.core.clone();
        let handle = tokio::spawn(core.run(reader, writer));
        *self.session.lock().expect("session mutex poisoned") = Some(handle);
    }

    /// Deny new invocations, drain in-flight ones, release the channel.
    pub async fn stop(&self, timeout: Duration) -> DrainOutcome {
        *self
            .stopped
            .get_or_init(|| async {
                self.shutting_down.store(true, Ordering::SeqCst);
                tracing::info!(
                    in_flight = self.tracker.in_flight(),
                    "MCP server draining"
                );

                let outcome = self.tracker.drain(timeout).await;

                let _ = self.closed.send(true);
                let handle = self.session.lock().expect("session mutex poisoned").take();
                if let Some(handle) = handle {
                    let abort = handle.abort_handle();
                    if tokio::time::timeout(SHUTDOWN_CLEANUP, handle).await.is_err() {
                        tracing::warn!("MCP session did not release the channel, aborting");
                        abort.abort();
                    }
                }

                tracing::info!(?outcome, "MCP server stopped");
                outcome
            })
            .await
    }
}

impl crate::lifecycle::Listener for McpListener {
    fn name(&self) -> &'static str {
        "mcp"
    }

    async fn start(&self) -> Result<(), StartupError> {
        McpListener::start(self).await
    }

    async fn stop(&self, timeout: Duration) -> DrainOutcome {
        McpListener::stop(self, timeout).await
    }
}

impl SessionCore {
    async fn run<R, W>(mut self, reader: R, writer: W)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        // Single writer task serializes responses from concurrent invocations.
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                if writer.write_all(line.as_bytes()).await.is_err()
                    || writer.write_all(b"\n").await.is_err()
                    || writer.flush().await.is_err()
                {
                    break;
                }
            }
            let _ = writer.shutdown().await;
        });

        let mut lines = reader.lines();
        // Local clone: the loop body borrows `self` while the close arm is
        // still pending.
        let mut closed = self.closed.clone();
        loop {
            tokio::select! {
                _ = closed.wait_for(|closed| *closed) => break,
                line = lines.next_line() => match line {
                    Ok(Some(line)) => self.handle_line(line.trim(), &tx),
                    Ok(None) => {
                        tracing::info!("MCP channel closed by peer");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "MCP channel read failed");
                        break;
                    }
                },
            }
        }

        drop(tx);
        let _ = writer_task.await;
    }

    fn handle_line(&self, line: &str, tx: &mpsc::UnboundedSender<String>) {
        if line.is_empty() {
            return;
        }
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    Response::failure(None, protocol::PARSE_ERROR, format!("Parse error: {e}"));
                let _ = tx.send(response.to_line());
                return;
            }
        };
        self.dispatch(request, tx);
    }

    fn dispatch(&self, request: Request, tx: &mpsc::UnboundedSender<String>) {
        match request.method.as_str() {
            "tools/list" => {
                let response =
                    Response::success(request.id, json!({ "tools": tools::catalogue() }));
                let _ = tx.send(response.to_line());
            }
            "tools/call" => self.dispatch_call(request, tx),
            other => {
                let response = Response::failure(
                    request.id,
                    protocol::METHOD_NOT_FOUND,
                    format!("Unknown method: {other}"),
                );
                let _ = tx.send(response.to_line());
            }
        }
    }

    fn dispatch_call(&self, request: Request, tx: &mpsc::UnboundedSender<String>) {
        // Shutdown denial is terminal and reported distinctly from
        // back-pressure, so it is checked before the window.
        if self.shutting_down.load(Ordering::SeqCst) {
            let err = ApiError::shutting_down();
            let response =
                Response::failure(request.id, protocol::error_code(err.kind()), err.message());
            let _ = tx.send(response.to_line());
            return;
        }
        if self.limiter.admit() == Admission::Denied {
            let err = ApiError::rate_limited();
            let response =
                Response::failure(request.id, protocol::error_code(err.kind()), err.message());
            let _ = tx.send(response.to_line());
            return;
        }

        let params: ToolCallParams = match serde_json::from_value(request.params) {
            Ok(params) => params,
            Err(_) => {
                let response = Response::failure(
                    request.id,
                    protocol::INVALID_PARAMS,
                    "Invalid tool call parameters",
                );
                let _ = tx.send(response.to_line());
                return;
            }
        };

        // Track before the handler runs; the guard releases on every path.
        let guard = self.tracker.track();
        let docker = Arc::clone(&self.docker);
        let tx = tx.clone();
        let id = request.id;
        tokio::spawn(async move {
            let _guard = guard;
            let response = match tools::dispatch(&docker, &params.name, &params.arguments).await {
                Ok(text) => Response::success(
                    id,
                    json!({ "content": [{ "type": "text", "text": text }] }),
                ),
                Err(err) => {
                    Response::failure(id, protocol::error_code(err.kind()), err.message())
                }
            };
            let _ = tx.send(response.to_line());
        });
    }
}
