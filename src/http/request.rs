//! Per-request bookkeeping.
//!
//! # Responsibilities
//! - Hand out a process-wide sequence number per inbound request
//! - Recover the client address recorded by the connection layer
//!
//! # Design Decisions
//! - Sequence numbers exist for log correlation only; no request state is shared

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Global atomic counter for request sequence numbers.
/// Relaxed ordering is enough since only uniqueness is needed.
static REQUEST_SEQ_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Monotonic identifier for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestSeq(u64);

impl RequestSeq {
    /// Allocate the next sequence number.
    pub fn next() -> Self {
        Self(REQUEST_SEQ_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Client address, when the server was started with connect info.
pub fn client_addr<B>(request: &Request<B>) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}
