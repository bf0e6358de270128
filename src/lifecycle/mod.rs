//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Init logging/metrics → Bind listener (fatal on failure)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → In-flight requests finish or are dropped → Exit
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bind failure aborts before the accept loop starts
//! - In-flight forwards are bounded by the upstream timeout, so no drain deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
