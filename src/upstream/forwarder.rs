//! Outbound request execution.
//!
//! # Responsibilities
//! - Issue exactly one GET per proxy request
//! - Bound connect + read by the configured timeout
//! - Read the whole body and undo gzip, refusing bodies over the size cap
//! - Classify every failure into an `UpstreamOutcome`
//!
//! # Design Decisions
//! - The client never decompresses on its own; `Content-Encoding` is handled here
//! - System proxy settings are ignored: devices live on the local network
//! - Reason strings come from the innermost error so logs name the OS cause

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::CONTENT_ENCODING;

use crate::config::UpstreamConfig;
use crate::routing::ProxyTarget;
use crate::upstream::encoding::{gunzip, ContentCoding};
use crate::upstream::outcome::{BodyEncoding, UpstreamOutcome};
use crate::upstream::uri::upstream_url;

/// Number of body characters echoed into the success log line.
const PREVIEW_CHARS: usize = 100;

/// Performs the upstream half of a proxy request.
pub trait Forwarder: Send + Sync + 'static {
    /// Forward one request. Never fails: every failure mode is an outcome.
    fn forward(&self, target: &ProxyTarget) -> impl Future<Output = UpstreamOutcome> + Send;
}

/// `reqwest`-backed forwarder used in production.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpForwarder {
    /// Build the shared client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Forwarder for HttpForwarder {
    async fn forward(&self, target: &ProxyTarget) -> UpstreamOutcome {
        let url = upstream_url(target);
        tracing::info!(url = %url, "Proxying");

        let mut response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return self.classify_error(&url, &e),
        };

        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return too_large(&url, limit);
        }

        let status = response.status().as_u16();
        let coding = ContentCoding::from_header(
            response
                .headers()
                .get(CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok()),
        );

        let mut raw = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if raw.len() + chunk.len() > limit {
                        return too_large(&url, limit);
                    }
                    raw.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => return self.classify_error(&url, &e),
            }
        }
        let raw = Bytes::from(raw);

        let (body, encoding) = match coding {
            ContentCoding::Identity => (raw, BodyEncoding::Identity),
            ContentCoding::Gzip => {
                tracing::debug!(url = %url, compressed_len = raw.len(), "Decompressing gzip");
                match gunzip(&raw, limit) {
                    Ok(decoded) => (Bytes::from(decoded), BodyEncoding::Gzip),
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Gzip decode failed");
                        return UpstreamOutcome::OtherError {
                            reason: format!("gzip decode failed: {}", e),
                        };
                    }
                }
            }
            ContentCoding::Other(name) => {
                tracing::warn!(url = %url, encoding = %name, "Content encoding not handled, passing through");
                (raw, BodyEncoding::Unhandled(name))
            }
        };

        tracing::info!(
            url = %url,
            status,
            len = body.len(),
            preview = %preview(&body),
            "Success"
        );

        UpstreamOutcome::Success {
            status,
            body,
            encoding,
        }
    }
}

impl HttpForwarder {
    fn classify_error(&self, url: &str, err: &reqwest::Error) -> UpstreamOutcome {
        // Timeout first: a connect that runs out of time is a timeout, not a refusal
        if err.is_timeout() {
            tracing::warn!(url = %url, timeout = ?self.timeout, "Timeout");
            return UpstreamOutcome::Timeout;
        }

        let reason = root_cause(err);
        if err.is_connect() {
            tracing::warn!(url = %url, reason = %reason, "Connection failed");
            UpstreamOutcome::ConnectionFailed { reason }
        } else {
            tracing::error!(url = %url, reason = %reason, "Proxy error");
            UpstreamOutcome::OtherError { reason }
        }
    }
}

fn too_large(url: &str, limit: usize) -> UpstreamOutcome {
    tracing::warn!(url = %url, limit, "Response body too large");
    UpstreamOutcome::OtherError {
        reason: format!("response body exceeds {} bytes", limit),
    }
}

/// Innermost message in an error's source chain.
fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Single-line printable prefix of a body for logs.
fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
