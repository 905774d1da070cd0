//! HTTP server startup and lifecycle management.
//!
//! Binds the listener, serves the router, and drains in-flight requests
//! when a shutdown signal arrives.

mod error;
mod shutdown;

use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;

pub use crate::server::error::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::server::shutdown::shutdown_signal;

/// Tracing target for server startup events.
const TRACING_TARGET_STARTUP: &str = "mercado::cli::startup";

/// Tracing target for server shutdown events.
const TRACING_TARGET_SHUTDOWN: &str = "mercado::cli::shutdown";

/// Binds to the configured address and serves requests until shutdown.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the accept loop
/// fails while running.
pub async fn serve(app: Router, config: &ServerConfig) -> ServerResult<()> {
    let server_addr = config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            addr = %server_addr,
            error = %err,
            "failed to bind to address"
        );
        ServerError::bind(server_addr.to_string(), err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %server_addr,
        "server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "server is bound to all interfaces; check the firewall rules"
        );
    }

    let started_at = Instant::now();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await;

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                uptime_secs = started_at.elapsed().as_secs(),
                "server shut down gracefully"
            );
            Ok(())
        }
        Err(err) => {
            let error = ServerError::Runtime(err);
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %error,
                uptime_secs = started_at.elapsed().as_secs(),
                "server encountered a fatal error"
            );

            if let Some(suggestion) = error.suggestion() {
                tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    suggestion,
                    "recovery suggestion"
                );
            }

            Err(error)
        }
    }
}
