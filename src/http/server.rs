//! HTTP listener lifecycle.
//!
//! # Responsibilities
//! - Pre-flight bind probe, then the real bind (AddressInUse vs Bind split)
//! - Build the Axum router with CORS, tracking, auth and admission layers
//! - Serve with graceful shutdown, force-aborting when the drain times out
//!
//! # Design Decisions
//! - `stop(timeout)` never blocks past `timeout` plus a bounded cleanup
//!   increment; a hung connection is aborted, not awaited
//! - Accept-loop failures are faults: they reach the orchestrator through the
//!   shutdown coordinator, unlike per-request errors which stop at dispatch

use axum::http::{header, HeaderName, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use std::net::SocketAddr;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::StartupError;
use crate::exec::CommandExecutor;
use crate::http::{handlers, middleware};
use crate::lifecycle::Shutdown;
use crate::security::{DrainOutcome, FixedWindowLimiter, RequestTracker};
use crate::services::{AuthService, CommandService, DockerService, LogService, SystemService};
use std::sync::Arc;

/// Per-connection socket timeout, matching the daemon's historical 2 minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Extra time granted after a drain decision to let the serve task settle.
const SHUTDOWN_CLEANUP: Duration = Duration::from_secs(1);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub docker: Arc<DockerService>,
    pub system: Arc<SystemService>,
    pub logs: Arc<LogService>,
    pub auth: Arc<AuthService>,
    pub command: Arc<CommandService>,
    pub api_key: Arc<str>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub tracker: RequestTracker,
}

/// HTTP front-end for the management API.
pub struct HttpListener {
    state: AppState,
    tracker: RequestTracker,
    bind_address: String,
    port: u16,
    close: watch::Sender<bool>,
    serve_task: Mutex<Option<JoinHandle<()>>>,
    // Per-connection task handles, so a timed-out drain can sever the
    // connections themselves, not just the accept loop.
    connections: Arc<Mutex<Vec<AbortHandle>>>,
    local_addr: OnceLock<SocketAddr>,
    shutdown: Shutdown,
}

impl HttpListener {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &Config, shutdown: Shutdown) -> Self {
        let tracker = RequestTracker::new();
        let state = AppState {
            docker: Arc::new(DockerService::new(executor.clone())),
            system: Arc::new(SystemService::new(executor.clone())),
            logs: Arc::new(LogService::new(executor.clone())),
            auth: Arc::new(AuthService::new()),
            command: Arc::new(CommandService::new(executor)),
            api_key: Arc::from(config.api_key.as_str()),
            limiter: Arc::new(FixedWindowLimiter::new(
                config.rate_limit.max_requests,
                config.rate_limit.window(),
            )),
            tracker: tracker.clone(),
        };
        let (close, _) = watch::channel(false);

        Self {
            state,
            tracker,
            bind_address: config.http.bind_address.clone(),
            port: config.http.port,
            close,
            serve_task: Mutex::new(None),
            connections: Arc::new(Mutex::new(Vec::new())),
            local_addr: OnceLock::new(),
            shutdown,
        }
    }

    /// Bind the listening endpoint and begin accepting requests.
    pub async fn start(&self) -> Result<(), StartupError> {
        let addr: SocketAddr = format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                StartupError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
            })?;

        // Bind-and-release probe: surface AddressInUse here instead of
        // letting the serve task fail after startup has been reported.
        let probe = TcpListener::bind(addr)
            .await
            .map_err(|e| classify_bind(e, self.port))?;
        drop(probe);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| classify_bind(e, self.port))?;
        let local_addr = listener.local_addr().map_err(StartupError::Bind)?;
        let _ = self.local_addr.set(local_addr);

        tracing::info!(address = %local_addr, "HTTP server listening");

        let app = build_router(self.state.clone());
        let mut close_rx = self.close.subscribe();
        // Separate receiver for connections: the accept loop's `wait_for`
        // holds a borrow of `close_rx` across the select arms.
        let conn_close = self.close.subscribe();
        let shutdown = self.shutdown.clone();
        let connections = Arc::clone(&self.connections);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = close_rx.wait_for(|closed| *closed) => break,
                    accepted = listener.accept() => {
                        let (stream, peer) = match accepted {
                            Ok(pair) => pair,
                            Err(e) => {
                                tracing::error!(error = %e, "HTTP accept loop failed");
                                shutdown.fault();
                                break;
                            }
                        };
                        tracing::debug!(%peer, "connection accepted");
                        let task = tokio::spawn(serve_connection(
                            stream,
                            app.clone(),
                            conn_close.clone(),
                        ));
                        let mut connections =
                            connections.lock().expect("connection set mutex poisoned");
                        connections.retain(|c| !c.is_finished());
                        connections.push(task.abort_handle());
                    }
                }
            }
        });
        *self.serve_task.lock().expect("serve task mutex poisoned") = Some(handle);

        Ok(())
    }

    /// Address actually bound, available after `start()` succeeds.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Stop accepting, drain in-flight requests, force-terminate the rest.
    pub async fn stop(&self, timeout: Duration) -> DrainOutcome {
        // Stop accepting and ask open keep-alive connections to close.
        let _ = self.close.send(true);

        let outcome = self.tracker.drain(timeout).await;

        if outcome == DrainOutcome::TimedOut {
            tracing::warn!("forcing HTTP server shutdown, severing connections");
            let connections = std::mem::take(
                &mut *self.connections.lock().expect("connection set mutex poisoned"),
            );
            for connection in connections {
                connection.abort();
            }
        }

        let handle = self.serve_task.lock().expect("serve task mutex poisoned").take();
        if let Some(handle) = handle {
            let _ = tokio::time::timeout(SHUTDOWN_CLEANUP, handle).await;
        }

        tracing::info!(?outcome, "HTTP server stopped");
        outcome
    }
}

/// Serve one accepted connection, honoring the close signal for keep-alive
/// teardown. The task holding this future is aborted outright when a drain
/// times out.
async fn serve_connection(
    stream: tokio::net::TcpStream,
    app: Router,
    mut close_rx: watch::Receiver<bool>,
) {
    let io = TokioIo::new(stream);
    let service = TowerToHyperService::new(app);
    let builder = auto::Builder::new(TokioExecutor::new());
    let mut connection = std::pin::pin!(builder.serve_connection_with_upgrades(io, service));

    tokio::select! {
        result = connection.as_mut() => {
            if let Err(e) = result {
                tracing::debug!(error = %e, "connection closed with error");
            }
        }
        _ = async { let _ = close_rx.wait_for(|closed| *closed).await; } => {
            // Finish in-flight exchanges, then close instead of keeping alive.
            connection.as_mut().graceful_shutdown();
            let _ = connection.as_mut().await;
        }
    }
}

impl crate::lifecycle::Listener for HttpListener {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn start(&self) -> Result<(), StartupError> {
        HttpListener::start(self).await
    }

    async fn stop(&self, timeout: Duration) -> DrainOutcome {
        HttpListener::stop(self, timeout).await
    }
}

fn classify_bind(e: std::io::Error, port: u16) -> StartupError {
    if e.kind() == std::io::ErrorKind::AddrInUse {
        StartupError::AddressInUse(port)
    } else {
        StartupError::Bind(e)
    }
}

fn build_router(state: AppState) -> Router {
    // Probes stay outside the authenticated nest: no key, no admission check.
    let open = Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::service_status))
        .route("/api", get(handlers::service_status));

    let protected = Router::new()
        .route(
            "/api/containers",
            get(handlers::list_containers).post(handlers::create_container),
        )
        .route("/api/command", post(handlers::run_command))
        .route("/api/system/status", get(handlers::system_status))
        .route("/api/services", post(handlers::manage_service))
        .route("/api/logs", get(handlers::fetch_logs))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        // Unknown paths answer behind the same checks as real routes, so a
        // caller without the key sees 401, never 404.
        .fallback(handlers::not_found)
        // Outermost layer is added last: auth runs before admission.
        .layer(from_fn_with_state(state.clone(), middleware::enforce_rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::require_api_key));

    open.merge(protected)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer())
        .layer(from_fn_with_state(state.clone(), middleware::track_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")])
}
