//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Tells every open connection to shut down gracefully: idle keep-alive
//!    connections close at once, busy ones finish their current request.
//! 3. Waits for that drain for at most [`SHUTDOWN_TIMEOUT`], aborts whatever
//!    is still running and returns from [`Server::serve`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::middleware;
use crate::request::Request;
use crate::response::{ErrorResponse, Response};
use crate::router::Router;
use crate::status::Status;

/// Upper bound on connection draining once a shutdown signal arrives.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest request body buffered before answering `400`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The HTTP server, holding a bound listener.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds to `addr`. Host names are resolved, so `localhost:8082` works.
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), students_api::Error> {
    /// use students_api::Server;
    /// let server = Server::bind("127.0.0.1:0").await?;
    /// println!("listening on {}", server.local_addr()?);
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: &str) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// The address actually bound; useful after binding port `0`.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        let router = Arc::new(router);

        info!(%addr, "server started");

        let mut tasks = tokio::task::JoinSet::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutting down the server");
                    let _ = shutdown_tx.send(true);
                    break;
                }

                res = self.listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);
                    let mut shutdown_rx = shutdown_rx.clone();

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req).await }
                        });

                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        let result = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = shutdown_rx.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.as_mut().await
                            }
                        };
                        if let Err(e) = result {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        let drain = async { while tasks.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await.is_err() {
            warn!(aborted = tasks.len(), "shutdown timeout elapsed, aborting connections");
            tasks.shutdown().await;
        }

        info!("server shutdown successfully");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers the body, routes, and converts back to a hyper response.
///
/// Every failure becomes a JSON envelope, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let started_at = Instant::now();
    let (parts, body) = req.into_parts();
    let method_name = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let response = match Method::try_from(&parts.method) {
        Err(()) => ErrorResponse::general(format!("method {} not allowed", parts.method))
            .with_status(Status::MethodNotAllowed),
        Ok(method) => match read_body(body, MAX_BODY_BYTES).await {
            Ok(bytes) => router.handle(Request::from_parts(parts, method, bytes)).await,
            Err(envelope) => envelope.with_status(Status::BadRequest),
        },
    };

    middleware::trace(&method_name, &path, &response, started_at);
    Ok(Response::into_inner(response))
}

/// Buffers at most `limit` bytes of `body`.
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, ErrorResponse>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(ErrorResponse::general(
            format!("request body exceeds {limit} bytes"),
        )),
        Err(e) => Err(ErrorResponse::general(format!("failed to read request body: {e}"))),
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::Full;

    use super::read_body;

    #[tokio::test]
    async fn reads_body_within_limit() {
        let bytes = read_body(Full::new(Bytes::from_static(b"{}")), 16).await.unwrap();
        assert_eq!(&bytes[..], b"{}");
    }

    #[tokio::test]
    async fn rejects_body_over_limit() {
        let body = Full::new(Bytes::from(vec![b'a'; 17]));

        let envelope = read_body(body, 16).await.expect_err("oversized body should fail");
        assert_eq!(envelope.status, "error");
        assert_eq!(envelope.error, "request body exceeds 16 bytes");
    }
}
