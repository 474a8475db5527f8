//! HTTP server.
//!
//! A hyper HTTP/1.1 server in front of a [`Dispatcher`]:
//!
//! - TCP accept loop, one task per connection
//! - the body is collected and the pipeline runs on the blocking pool, both
//!   under the request timeout
//! - graceful shutdown: stop accepting, let open connections finish their
//!   current request, give up after the shutdown timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use heron_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::new(ServerConfig::default(), dispatcher);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use crate::adapter::{context_from_http, into_http_response};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use bytes::Bytes;
use heron_core::{Outcome, RequestContext, RequestId};
use heron_pipeline::stages::ContentNegotiation;
use heron_pipeline::{Dispatcher, PipelineStage, Response};
use heron_telemetry::metrics::{self, InFlightGuard};
use http::request::Parts;
use http::Request;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// HTTP response type produced by the server.
pub type HttpResponse = http::Response<Full<Bytes>>;

/// Serves a dispatcher over HTTP.
pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Creates a server.
    #[must_use]
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self::with_shared(config, Arc::new(dispatcher))
    }

    /// Creates a server over a shared dispatcher.
    #[must_use]
    pub fn with_shared(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the configured address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the configured address is invalid or
    /// cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!("invalid address '{}': {e}", self.config.http_addr()))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Io` if the listener address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, remote, shutdown).await {
                                tracing::debug!(remote = %remote, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        tracing::info!(
            connections = tracker.active_connections(),
            timeout_secs = timeout.as_secs(),
            "waiting for open connections"
        );

        if tokio::time::timeout(timeout, tracker.wait_for_idle()).await.is_err() {
            tracing::warn!(
                connections = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req, remote).await) }
        });

        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        let mut draining = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => return result,
                () = shutdown.recv(), if !draining => {
                    conn.as_mut().graceful_shutdown();
                    draining = true;
                }
            }
        }
    }

    /// Runs one request through the pipeline. Always yields a response.
    async fn handle_request(&self, req: Request<Incoming>, remote: SocketAddr) -> HttpResponse {
        let _in_flight = InFlightGuard::new();
        let timeout = self.config.request_timeout();
        let (parts, body) = req.into_parts();

        let body = match tokio::time::timeout(timeout, body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read request body");
                return self.fallback(&parts, RequestId::new(), Outcome::internal_error(e.to_string()));
            }
            Err(_) => {
                tracing::warn!("timed out reading request body");
                return self.fallback(&parts, RequestId::new(), timeout_outcome());
            }
        };
        metrics::record_request_size(body.len());

        let mut ctx = context_from_http(&parts, body, Some(remote));
        let request_id = ctx.request_id();
        let dispatcher = Arc::clone(&self.dispatcher);

        let task = tokio::task::spawn_blocking(move || dispatcher.handle(&mut ctx));

        let response = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(request_id = %request_id, error = %e, "dispatch task failed");
                return self.fallback(&parts, request_id, Outcome::internal_error(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(request_id = %request_id, "request timed out");
                return self.fallback(&parts, request_id, timeout_outcome());
            }
        };

        metrics::record_response_size(response.body.len());
        into_http_response(response, request_id)
    }

    /// Builds an envelope for a request that never finished the pipeline.
    fn fallback(&self, parts: &Parts, request_id: RequestId, outcome: Outcome) -> HttpResponse {
        let mut ctx: RequestContext =
            context_from_http(parts, Bytes::new(), None).with_request_id(request_id);
        ContentNegotiation.process(&mut ctx);
        ctx.set_outcome(outcome);

        let response: Response = self.dispatcher.responses().build(&ctx);
        metrics::record_request(&ctx.outcome().code, response.status, ctx.elapsed());
        into_http_response(response, request_id)
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

fn timeout_outcome() -> Outcome {
    Outcome::internal_error("request timed out")
}
