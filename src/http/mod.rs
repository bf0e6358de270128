//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one Tokio task each)
//!     → server.rs (Axum setup, dispatch)
//!     → request.rs (sequence number, client address)
//!     → routing::PathRouter (proxy or static)
//!     → upstream::Forwarder (proxy only)
//!     → response.rs (outcome → status, JSON body, headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RequestSeq;
pub use response::{allow_any_origin, DownstreamResponse, OFFLINE};
pub use server::{AppState, HttpServer};
