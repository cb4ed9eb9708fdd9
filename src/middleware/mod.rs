//! Middleware layer.
//!
//! Cross-cutting concerns that wrap every routed request. For now that is a
//! single access-log event per request, emitted by the server's dispatch
//! path after the response has been produced.

use std::time::Instant;

use tracing::{info, warn};

use crate::response::Response;

/// Emits one `tracing` event with method, path, status and latency.
///
/// Server errors are logged at `warn`, everything else at `info`.
pub fn trace(method: &http::Method, path: &str, response: &Response, started_at: Instant) {
    let status = u16::from(response.status_code());
    let latency_ms = started_at.elapsed().as_secs_f64() * 1000.0;

    if status >= 500 {
        warn!(%method, path, status, latency_ms, "request completed");
    } else {
        info!(%method, path, status, latency_ms, "request completed");
    }
}
