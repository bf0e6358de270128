//! Terminal classification of one forwarding attempt.

use axum::body::Bytes;

/// How the upstream body was transfer-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEncoding {
    /// No `Content-Encoding` (or `identity`).
    Identity,
    /// Gzip body, already decompressed.
    Gzip,
    /// Some other coding; the body is passed through untouched.
    Unhandled(String),
}

/// Result of forwarding a request to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    Success {
        status: u16,
        body: Bytes,
        encoding: BodyEncoding,
    },
    /// Connect + read exceeded the configured timeout.
    Timeout,
    /// Refused, unreachable or unresolvable host.
    ConnectionFailed { reason: String },
    /// Anything else: bad URL, broken response, corrupt gzip.
    OtherError { reason: String },
}

impl UpstreamOutcome {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamOutcome::Success { .. } => "success",
            UpstreamOutcome::Timeout => "timeout",
            UpstreamOutcome::ConnectionFailed { .. } => "connection_failed",
            UpstreamOutcome::OtherError { .. } => "error",
        }
    }

    /// Name of a coding the proxy passed through without decoding.
    pub fn unhandled_encoding(&self) -> Option<&str> {
        match self {
            UpstreamOutcome::Success {
                encoding: BodyEncoding::Unhandled(name),
                ..
            } => Some(name),
            _ => None,
        }
    }
}
