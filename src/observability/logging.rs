//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber with console and file sinks
//! - Route access lines for failed responses to stderr
//! - Configure log level from config, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - The file sink writes through an unbuffered `File`, so each event reaches
//!   the OS before the logging call returns and survives an abrupt kill
//! - Access lines carry the client address; the formatter adds the timestamp
//! - The file sink has its own field formatter type. Span fields are cached
//!   per formatter type, so sharing `DefaultFields` with the coloured console
//!   layers would leak ANSI escapes into the file

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, Layer};

use crate::config::LoggingConfig;

/// Target used for access lines (downstream status >= 400).
pub const ACCESS_TARGET: &str = "dashboard_proxy::access";

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    File(#[from] io::Error),

    #[error("logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Default directive set when `RUST_LOG` is absent.
fn default_directives(level: &str) -> String {
    format!("dashboard_proxy={level},tower_http=warn")
}

/// Field formatter for the file sink.
struct PlainFields(DefaultFields);

impl<'writer> FormatFields<'writer> for PlainFields {
    fn format_fields<R: RecordFields>(
        &self,
        writer: Writer<'writer>,
        fields: R,
    ) -> std::fmt::Result {
        self.0.format_fields(writer, fields)
    }
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let file_layer = match config.file_path() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .fmt_fields(PlainFields(DefaultFields::new()))
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stdout_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(filter_fn(|meta| meta.target() != ACCESS_TARGET));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(path) = config.file_path() {
        tracing::debug!(path = %path.display(), "Log file sink attached");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_crate_level() {
        assert_eq!(
            default_directives("debug"),
            "dashboard_proxy=debug,tower_http=warn"
        );
    }

    #[test]
    fn access_target_is_under_crate_directive() {
        assert!(ACCESS_TARGET.starts_with("dashboard_proxy"));
    }
}
