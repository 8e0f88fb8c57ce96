//! Test helpers for E2E tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use warden_policy::{Policy, PolicyId};
use warden_webhooks::{AppConfig, FailingPoliciesWebhookSettings};

/// How the receiver answers each request.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Answer with this status immediately.
    Status(u16),
    /// Hold the response for this long, then answer 200.
    Delay(Duration),
}

/// Local HTTP endpoint that records every JSON body it receives.
pub struct WebhookReceiver {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    handle: JoinHandle<()>,
}

impl WebhookReceiver {
    /// Start a receiver on an ephemeral port.
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let sink = sink.clone();
                tokio::spawn(async move {
                    handle_connection(socket, reply, sink).await;
                });
            }
        });

        Self {
            addr,
            received,
            handle,
        }
    }

    /// URL to configure as the webhook destination.
    pub fn url(&self) -> String {
        format!("http://{}/webhook", self.addr)
    }

    /// Bodies received so far, oldest first.
    pub async fn received(&self) -> Vec<serde_json::Value> {
        self.received.lock().await.clone()
    }
}

impl Drop for WebhookReceiver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    reply: Reply,
    sink: Arc<Mutex<Vec<serde_json::Value>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let body_start = loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..body_start]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < body_start + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let status = match reply {
        Reply::Status(status) => status,
        Reply::Delay(delay) => {
            tokio::time::sleep(delay).await;
            200
        }
    };

    if (200..300).contains(&status) {
        if let Ok(body) = serde_json::from_slice(&buf[body_start..body_start + content_length]) {
            sink.lock().await.push(body);
        }
    }

    let response = format!("HTTP/1.1 {status} X\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
    let _ = socket.write_all(response.as_bytes()).await;
}

/// On-disk layout for a test run.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    /// Create a workspace holding the given policies.
    pub fn with_policies(policies: &[Policy]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("policies.json"),
            serde_json::to_vec(policies).unwrap(),
        )
        .unwrap();
        Self { dir }
    }

    pub fn policies_path(&self) -> PathBuf {
        self.dir.path().join("policies.json")
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state").join("failing-sets.json")
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Enabled webhook configuration pointing at `destination`.
pub fn webhook_config(destination: &str, policy_ids: &[u32], timeout_secs: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.server_settings.server_url = "https://fleet.example.com".to_string();
    config.webhook_settings.failing_policies_webhook = FailingPoliciesWebhookSettings::enabled(
        destination,
        policy_ids.iter().copied().map(PolicyId::new).collect(),
    )
    .with_timeout_secs(timeout_secs);
    config
}

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
