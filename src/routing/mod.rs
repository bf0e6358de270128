//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path (+ optional query)
//!     → router.rs (prefix check, host/rest split)
//!     → Return: Route::Proxy(ProxyTarget) or Route::Static
//! ```
//!
//! # Design Decisions
//! - No regex in hot path (prefix strip + single split)
//! - Deterministic: same input always yields the same route
//! - Any non-matching path falls through to static serving; there is no error route
//! - No host allow-list: the proxy is an open relay for trusted networks

pub mod router;

pub use router::{PathRouter, ProxyTarget, Route, PROXY_PREFIX};
