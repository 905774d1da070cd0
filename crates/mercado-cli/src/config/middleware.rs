//! Middleware configuration for the HTTP server.
//!
//! Groups the CLI-configurable middleware settings: CORS, OpenAPI
//! publishing paths, and request recovery (timeouts and panic handling).
//! The underlying config types come from `mercado-server` and support both
//! CLI arguments and environment variables.
//!
//! # Example
//!
//! ```bash
//! # Configure CORS origins and the request timeout
//! mercado-cli --cors-origins "https://example.com" --request-timeout 60
//! ```
//!
//! The `--request-timeout` flag feeds the recovery layer; requests running
//! past it are terminated with a 500 response.

use clap::Args;
use mercado_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::config::TRACING_TARGET;

/// Middleware configuration combining CORS, OpenAPI, and recovery settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// OpenAPI document publishing configuration.
    #[clap(flatten)]
    pub open_api: OpenApiConfig,

    /// Recovery middleware configuration (timeouts, panic handling).
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET,
            openapi_path = %self.open_api.open_api_json,
            scalar_path = %self.open_api.scalar_ui,
            "OpenAPI configuration"
        );

        tracing::info!(
            target: TRACING_TARGET,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}
