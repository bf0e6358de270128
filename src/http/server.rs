//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a single dispatch handler
//! - Compose path router → forwarder → translator per request
//! - Delegate non-proxy requests to the static file service
//! - Apply the CORS header to every response exactly once
//! - Log failed responses with the client address
//! - Serve until the shutdown signal fires
//!
//! # Concurrency
//! `axum::serve` runs every connection on its own Tokio task, so a device that
//! takes the full upstream timeout only delays the requests addressed to it.

use axum::{
    body::Body,
    extract::State,
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::{Instrument, Level};

use crate::config::ServerConfig;
use crate::http::request::{client_addr, RequestSeq};
use crate::http::response::DownstreamResponse;
use crate::lifecycle::StartupError;
use crate::observability::{logging::ACCESS_TARGET, metrics};
use crate::routing::{PathRouter, ProxyTarget, Route};
use crate::upstream::{Forwarder, HttpForwarder};

/// Application state injected into the handler.
pub struct AppState<F> {
    pub router: Arc<PathRouter>,
    pub forwarder: Arc<F>,
    pub static_files: ServeDir,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            forwarder: Arc::clone(&self.forwarder),
            static_files: self.static_files.clone(),
        }
    }
}

/// HTTP server for the dashboard proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
}

impl HttpServer {
    /// Create a server that forwards with the production HTTP client.
    pub fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let forwarder = HttpForwarder::new(&config.upstream)?;
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Create a server around any forwarder.
    pub fn with_forwarder<F: Forwarder>(config: ServerConfig, forwarder: F) -> Self {
        let state = AppState {
            router: Arc::new(PathRouter::default()),
            forwarder: Arc::new(forwarder),
            static_files: ServeDir::new(&config.static_files.root),
        };

        Self {
            router: Self::build_router(state),
            config: Arc::new(config),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<F: Forwarder>(state: AppState<F>) -> Router {
        Router::new()
            .fallback(dispatch::<F>)
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            // failed responses already get an access line from `dispatch`
            .layer(
                TraceLayer::new_for_http()
                    .on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
            )
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            static_root = %self.config.static_files.root.display(),
            upstream_timeout = ?self.config.upstream.timeout(),
            "HTTP server starting"
        );
        tracing::info!("Open http://localhost:{}", addr.port());

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutting down, no longer accepting connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point for every inbound request.
async fn dispatch<F: Forwarder>(
    State(state): State<AppState<F>>,
    request: Request<Body>,
) -> Response {
    let seq = RequestSeq::next();
    let client = client_addr(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = match method {
        Method::GET => match state.router.route(request.uri()) {
            Route::Proxy(target) => {
                let span = tracing::info_span!("proxy", seq = %seq, host = %target.host);
                proxy(&state, target).instrument(span).await
            }
            Route::Static => serve_static(&state, request).await,
        },
        Method::HEAD => serve_static(&state, request).await,
        _ => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response(),
    };

    let status = response.status();
    if status.as_u16() >= 400 {
        let client = client.map_or_else(|| "-".to_string(), |addr| addr.to_string());
        tracing::warn!(
            target: ACCESS_TARGET,
            client = %client,
            seq = %seq,
            method = %method,
            path = %path,
            status = status.as_u16(),
            "Request failed"
        );
    }
    response
}

/// Forward to the device and translate the outcome.
async fn proxy<F: Forwarder>(state: &AppState<F>, target: ProxyTarget) -> Response {
    let started = Instant::now();
    let outcome = state.forwarder.forward(&target).await;
    metrics::record_outcome(&outcome, started);
    DownstreamResponse::from(outcome).into_response()
}

/// Serve from the document root: 200 with the file, 404 if absent.
async fn serve_static<F>(state: &AppState<F>, request: Request<Body>) -> Response {
    let response = match state.static_files.clone().oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };
    metrics::record_static(response.status().as_u16());
    response
}
