//! HTTP middleware: trusted-host filter, client-error bodies and panic capture.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::error::{internal_error_response, ApiError};

/// Host allow-list.
///
/// Entries are matched without their port. `*` accepts every host and
/// `*.example.com` accepts any subdomain of `example.com`.
#[derive(Debug, Clone)]
pub struct TrustedHosts {
    patterns: Vec<String>,
    allow_any: bool,
}

impl TrustedHosts {
    /// Build from raw allow-list entries.
    pub fn new<I, T>(hosts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let patterns: Vec<String> = hosts
            .into_iter()
            .map(|h| strip_port(h.as_ref().trim()).to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        let allow_any = patterns.iter().any(|p| p == "*");

        Self {
            patterns,
            allow_any,
        }
    }

    /// Whether a Host value (port allowed) is on the list.
    pub fn is_allowed(&self, host: &str) -> bool {
        if self.allow_any {
            return true;
        }

        let host = strip_port(host.trim()).to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }

        self.patterns.iter().any(|pattern| match pattern.strip_prefix('*') {
            Some(suffix) if suffix.starts_with('.') => host.ends_with(suffix),
            _ => *pattern == host,
        })
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal, e.g. [::1]:8000
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    host.split(':').next().unwrap_or(host)
}

/// Reject requests whose Host is not trusted, before any handler runs.
pub async fn trusted_host_middleware(
    State(trusted): State<Arc<TrustedHosts>>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    if !trusted.is_allowed(host) {
        warn!(host = %host, uri = %request.uri(), "Rejected untrusted host");
        return ApiError::InvalidHost.into_response();
    }

    next.run(request).await
}

/// Give bodiless 404/405 responses produced by the router a JSON `detail`.
pub async fn client_error_body_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.headers().contains_key(header::CONTENT_TYPE) {
        return response;
    }

    let error = match response.status() {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::METHOD_NOT_ALLOWED => ApiError::MethodNotAllowed,
        _ => return response,
    };

    let (parts, _) = response.into_parts();
    let mut replacement = error.into_response();
    if let Some(allow) = parts.headers.get(header::ALLOW) {
        replacement.headers_mut().insert(header::ALLOW, allow.clone());
    }
    replacement
}

/// Turn a handler panic into the uniform 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(error = %message, "Global exception");
    internal_error_response()
}
