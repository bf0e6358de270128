//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default cap on a device response body, before and after gzip decoding.
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Default user agent sent to devices.
///
/// Devices that serve an HTML UI to browsers answer API clients with JSON,
/// so proxy traffic must not look like a browser.
pub const DEFAULT_USER_AGENT: &str = "miners-dashboard-proxy";

/// Root configuration for the dashboard proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Local document root for non-proxy requests.
    pub static_files: StaticFilesConfig,

    /// Outbound request settings.
    pub upstream: UpstreamConfig,

    /// Log sinks.
    pub logging: LoggingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0" for all interfaces).
    pub bind_address: String,

    /// Listening port.
    pub port: u16,
}

impl ListenerConfig {
    /// Resolve the socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.bind_address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Static file serving.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served for every request that is not a proxy request.
    pub root: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Outbound (device-facing) request configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Whole-request timeout (connect + read) in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent header sent with every forwarded request.
    pub user_agent: String,

    /// Largest body accepted from a device, checked on the wire and after decoding.
    pub max_body_bytes: usize,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    /// Append-only log file mirroring console output. Empty disables the file sink.
    pub file: String,
}

impl LoggingConfig {
    /// Path of the file sink, if enabled.
    pub fn file_path(&self) -> Option<&Path> {
        if self.file.trim().is_empty() {
            None
        } else {
            Some(Path::new(&self.file))
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "dashboard.log".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
