//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, fanned out to sinks)
//!     → metrics.rs (counters, histograms)
//!
//! Sinks:
//!     → stdout (everything except access lines)
//!     → stderr (access lines for responses >= 400)
//!     → append-only log file (everything, unbuffered)
//! ```
//!
//! # Design Decisions
//! - Sinks are configured explicitly at startup; stdout itself is never redirected
//! - Metrics are diagnostics only and off the request's critical path

pub mod logging;
pub mod metrics;
