//! Path classification.
//!
//! # Responsibilities
//! - Recognise `/proxy/<host>/<rest>` and extract the target
//! - Send everything else to the static file branch
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - `host` is opaque: any run of non-slash characters is accepted
//! - `rest` is kept raw here; encoding happens when the upstream URL is built

use axum::http::Uri;

/// Path prefix that marks a proxy request.
pub const PROXY_PREFIX: &str = "/proxy/";

/// Destination extracted from one proxy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    /// Device address: IP, hostname, optionally with `:port`. Never contains `/`.
    pub host: String,
    /// Remainder of the inbound path after `<host>/`. May be empty or contain slashes.
    pub path: String,
    /// Raw inbound query string, forwarded verbatim.
    pub query: Option<String>,
}

impl ProxyTarget {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Result of classifying an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Proxy(ProxyTarget),
    Static,
}

/// Splits proxy requests from static ones.
#[derive(Debug, Clone)]
pub struct PathRouter {
    prefix: String,
}

impl PathRouter {
    /// Create a router for a custom prefix. The prefix must start and end with `/`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Classify a request URI.
    pub fn route(&self, uri: &Uri) -> Route {
        self.classify(uri.path(), uri.query())
    }

    /// Classify a raw path and query.
    pub fn classify(&self, path: &str, query: Option<&str>) -> Route {
        let Some(remainder) = path.strip_prefix(self.prefix.as_str()) else {
            return Route::Static;
        };

        // `<host>/<rest>`: host needs at least one character and the slash after it
        match remainder.split_once('/') {
            Some((host, rest)) if !host.is_empty() => Route::Proxy(ProxyTarget {
                host: host.to_string(),
                path: rest.to_string(),
                query: query.map(str::to_string),
            }),
            _ => Route::Static,
        }
    }
}

impl Default for PathRouter {
    fn default() -> Self {
        Self::with_prefix(PROXY_PREFIX)
    }
}
