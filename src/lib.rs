//! Local CORS proxy that lets a browser dashboard query devices on the LAN.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
