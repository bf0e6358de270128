//! Dashboard proxy
//!
//! Serves a browser dashboard and relays its API calls to headless devices
//! on the local network, adding the CORS header browsers require.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                   DASHBOARD PROXY                    │
//!                    │                                                      │
//!   Browser request  │  ┌──────────┐    ┌──────────┐   proxy  ┌───────────┐  │
//!   ─────────────────┼─▶│ listener │───▶│ routing  │─────────▶│ upstream  │──┼──▶ Device
//!                    │  │ (task per│    │PathRouter│          │ Forwarder │  │    (HTTP/JSON)
//!                    │  │  conn)   │    └────┬─────┘          └─────┬─────┘  │
//!                    │  └──────────┘         │ static               │        │
//!                    │                       ▼                      ▼        │
//!   Browser response │                 ┌──────────┐          ┌───────────┐  │
//!   ◀────────────────┼─────────────────│ ServeDir │          │ response  │  │
//!                    │◀────────────────┴──────────┴──────────│translator │  │
//!                    │                                       └───────────┘  │
//!                    │     config · observability · lifecycle               │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dashboard_proxy::config::{self, ConfigError, ServerConfig};
use dashboard_proxy::lifecycle::{signals, startup, Shutdown, StartupError};
use dashboard_proxy::observability::{logging, metrics};
use dashboard_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "dashboard-proxy")]
#[command(about = "CORS proxy and static server for local device dashboards", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address
    #[arg(long)]
    bind: Option<String>,

    /// Static file root
    #[arg(long)]
    root: Option<PathBuf>,

    /// Upstream timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log file (empty to disable)
    #[arg(long)]
    log_file: Option<String>,
}

impl Cli {
    /// Layer command-line flags over the file configuration.
    fn apply(self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(root) = self.root {
            config.static_files.root = root;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.upstream.timeout_ms = timeout_ms;
        }
        if let Some(log_file) = self.log_file {
            config.logging.file = log_file;
        }
    }
}

fn load(cli: Cli) -> Result<ServerConfig, StartupError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => config::parse_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);
    config::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = load(cli)?;
    logging::init(&config.logging)?;

    tracing::info!(
        port = config.listener.port,
        static_root = %config.static_files.root.display(),
        "Starting multi-task device dashboard proxy"
    );

    if config.observability.metrics_enabled {
        // validated at load time
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let listener = match startup::bind_listener(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start: is another instance already running?");
            return Err(e);
        }
    };

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
