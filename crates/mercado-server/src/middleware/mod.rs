//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Authentication guards plus router extension traits for the outer
//! middleware stack: security headers and CORS, request tracing, panic
//! and timeout recovery, and OpenAPI document publishing.

mod auth;
mod observability;
mod open_api;
mod recovery;
mod security;

pub use crate::middleware::auth::{require_admin, require_authentication};
pub use crate::middleware::observability::RouterObservabilityExt;
pub use crate::middleware::open_api::{OpenApiConfig, RouterOpenApiExt};
pub use crate::middleware::recovery::{RecoveryConfig, RouterRecoveryExt};
pub use crate::middleware::security::{CorsConfig, RouterSecurityExt};
