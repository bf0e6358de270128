//! Upstream (device-facing) forwarding.
//!
//! # Data Flow
//! ```text
//! ProxyTarget
//!     → uri.rs (build http://<host>/<encoded rest>[?query])
//!     → forwarder.rs (single GET, bounded timeout, full body read)
//!     → encoding.rs (undo gzip, flag anything else)
//!     → UpstreamOutcome (outcome.rs), consumed once by the translator
//! ```
//!
//! # Design Decisions
//! - No retries: every outcome is terminal for its request
//! - Failures are values, not errors; nothing here returns `Result` to the handler
//! - The HTTP client is built once and shared by all request tasks

pub mod encoding;
pub mod forwarder;
pub mod outcome;
pub mod uri;

pub use forwarder::{Forwarder, HttpForwarder};
pub use outcome::{BodyEncoding, UpstreamOutcome};
pub use uri::upstream_url;
