//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::watch;

use hostdock::exec::{CommandExecutor, CommandOutput, ExecError};
use hostdock::{Config, HttpListener, McpListener, Shutdown};

/// Executor returning a canned result, recording every command line.
pub struct MockExecutor {
    pub commands: Mutex<Vec<String>>,
    stdout: String,
    stderr: String,
    exit_code: i32,
}

impl MockExecutor {
    pub fn ok(stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
        })
    }

    pub fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: 1,
        })
    }

    pub fn call_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutput, ExecError> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(CommandOutput {
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            exit_code: self.exit_code,
        })
    }
}

/// Executor that blocks every call until the returned gate is opened.
pub struct GatedExecutor {
    release: watch::Receiver<bool>,
    pub calls: AtomicUsize,
}

impl GatedExecutor {
    pub fn new() -> (Arc<Self>, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (
            Arc::new(Self {
                release: rx,
                calls: AtomicUsize::new(0),
            }),
            tx,
        )
    }
}

#[async_trait]
impl CommandExecutor for GatedExecutor {
    async fn execute(&self, _command: &str) -> Result<CommandOutput, ExecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut release = self.release.clone();
        let _ = release.wait_for(|open| *open).await;
        Ok(CommandOutput {
            stdout: "released".to_string(),
            stderr: String::new(),
            exit_code: 0,
        })
    }
}

/// Executor that completes after a fixed delay.
pub struct DelayExecutor(pub Duration);

#[async_trait]
impl CommandExecutor for DelayExecutor {
    async fn execute(&self, _command: &str) -> Result<CommandOutput, ExecError> {
        tokio::time::sleep(self.0).await;
        Ok(CommandOutput {
            stdout: "done".to_string(),
            stderr: String::new(),
            exit_code: 0,
        })
    }
}

pub const TEST_API_KEY: &str = "test-secret";

pub fn test_config(max_requests: u32, window_ms: u64) -> Config {
    let mut config = Config::default();
    config.api_key = TEST_API_KEY.to_string();
    config.http.bind_address = "127.0.0.1".to_string();
    config.http.port = 0;
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window_ms = window_ms;
    config
}

/// Start an HTTP listener on an ephemeral port.
pub async fn start_http(
    executor: Arc<dyn CommandExecutor>,
    config: &Config,
) -> (Arc<HttpListener>, String) {
    let listener = Arc::new(HttpListener::new(executor, config, Shutdown::new()));
    listener.start().await.expect("http listener should start");
    let addr = listener.local_addr().expect("bound address");
    (listener, format!("http://{addr}"))
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("reqwest client")
}

/// Test-side end of an in-memory MCP session.
pub struct McpClient {
    reader: tokio::io::Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl McpClient {
    pub async fn send(&mut self, request: Value) {
        let mut line = request.to_string();
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .expect("write request");
    }

    pub async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.reader.next_line())
            .await
            .expect("response within 5s")
            .expect("channel open")
            .expect("a response line");
        serde_json::from_str(&line).expect("valid JSON-RPC response")
    }
}

/// Start an MCP listener over an in-memory duplex transport.
pub fn start_mcp(executor: Arc<dyn CommandExecutor>, config: &Config) -> (Arc<McpListener>, McpClient) {
    let listener = Arc::new(McpListener::new(executor, config));
    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    listener.attach(BufReader::new(server_read), server_write);

    let (client_read, client_write) = tokio::io::split(client_side);
    (
        listener,
        McpClient {
            reader: BufReader::new(client_read).lines(),
            writer: client_write,
        },
    )
}
