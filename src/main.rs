use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostdock::exec::ShellExecutor;
use hostdock::lifecycle::signals;
use hostdock::{config, ExitReason, HttpListener, McpListener, Orchestrator, Shutdown};

#[derive(Parser)]
#[command(name = "hostdock", about = "Container and host management daemon")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the HTTP listening port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr: stdout is the MCP channel.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostdock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::from(1);
        }
    };
    if let Some(port) = args.port {
        config.http.port = port;
    }

    tracing::info!(
        port = config.http.port,
        rate_limit = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        "configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let executor = Arc::new(ShellExecutor);
    let http = HttpListener::new(executor.clone(), &config, shutdown.clone());
    let mcp = McpListener::new(executor, &config);

    let orchestrator = Orchestrator::new(http, mcp, shutdown, config.shutdown.clone());
    match orchestrator.run().await {
        Ok(ExitReason::Clean) => ExitCode::SUCCESS,
        Ok(reason) => {
            tracing::warn!(?reason, "exited non-gracefully");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            ExitCode::from(1)
        }
    }
}
