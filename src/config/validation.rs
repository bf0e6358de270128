//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not an IP address")]
    BindAddress(String),

    #[error("upstream.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("upstream.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("upstream.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("upstream.user_agent `{0}` is not a valid header value")]
    InvalidUserAgent(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let user_agent = &config.upstream.user_agent;
    if user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    } else if HeaderValue::from_str(user_agent).is_err() {
        errors.push(ValidationError::InvalidUserAgent(user_agent.clone()));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
