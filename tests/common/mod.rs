//! Shared utilities for integration tests: fake devices and a running proxy.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashboard_proxy::config::ServerConfig;
use dashboard_proxy::lifecycle::Shutdown;
use dashboard_proxy::HttpServer;
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What a fake device answers.
#[derive(Debug, Clone)]
pub struct DeviceReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl DeviceReply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn gzip_json(body: &str) -> Self {
        let mut reply = Self::json(body);
        reply.body = gzip(body.as_bytes());
        reply.header("Content-Encoding", "gzip")
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A fake device speaking just enough HTTP/1.1.
pub struct Device {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
    last_request: Arc<tokio::sync::Mutex<String>>,
}

impl Device {
    /// `host[:port]` as used in a `/proxy/<host>/...` path.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request head of the most recent request.
    pub async fn last_request(&self) -> String {
        self.last_request.lock().await.clone()
    }
}

/// Start a device on an ephemeral port that always sends `reply`.
pub async fn start_device(reply: DeviceReply) -> Device {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let last_request = Arc::new(tokio::sync::Mutex::new(String::new()));

    let device = Device {
        addr,
        hits: hits.clone(),
        last_request: last_request.clone(),
    };

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let reply = reply.clone();
            let hits = hits.clone();
            let last_request = last_request.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while read < buf.len() {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                hits.fetch_add(1, Ordering::SeqCst);
                *last_request.lock().await = String::from_utf8_lossy(&buf[..read]).into_owned();

                tokio::time::sleep(reply.delay).await;

                let mut head = format!("HTTP/1.1 {} {}\r\n", reply.status, reason_phrase(reply.status));
                for (name, value) in &reply.headers {
                    head.push_str(&format!("{}: {}\r\n", name, value));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    reply.body.len()
                ));

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&reply.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    device
}

/// Start a listener that accepts connections and never answers.
pub async fn start_silent_device() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A proxy running on an ephemeral port.
pub struct Proxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl Proxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Proxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Test configuration: short timeout, no log file, given static root.
pub fn test_config(static_root: &Path, timeout: Duration) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1".into();
    config.listener.port = 0;
    config.static_files.root = static_root.to_path_buf();
    config.upstream.timeout_ms = timeout.as_millis() as u64;
    config.logging.file = String::new();
    config
}

pub async fn start_proxy(config: ServerConfig) -> Proxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Proxy { addr, shutdown }
}

/// Downstream client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
