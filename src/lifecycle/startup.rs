//! Startup orchestration.
//!
//! # Responsibilities
//! - Define the fatal startup errors
//! - Bind the listening socket before any traffic is accepted
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The bind error names the address so "port already in use" is obvious

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ListenerConfig};
use crate::observability::logging::LoggingError;

/// Conditions that abort the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("invalid bind address `{0}`")]
    Address(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind the listening socket described by the configuration.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let addr = config
        .socket_addr()
        .map_err(|_| StartupError::Address(config.bind_address.clone()))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(address = %addr, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn port_in_use_is_a_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ListenerConfig {
            bind_address: "127.0.0.1".into(),
            port: taken.local_addr().unwrap().port(),
        };

        let err = bind_listener(&config).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
        assert!(err.to_string().starts_with("failed to bind 127.0.0.1:"));
    }

    #[tokio::test]
    async fn bad_address_is_reported() {
        let config = ListenerConfig {
            bind_address: "not-an-ip".into(),
            port: 0,
        };
        assert!(matches!(
            bind_listener(&config).await,
            Err(StartupError::Address(_))
        ));
    }
}
