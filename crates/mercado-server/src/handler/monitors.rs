//! Service health handlers.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::extract::{AuthState, Json};
use crate::handler::{ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for health checks.
const TRACING_TARGET: &str = "mercado::handler::monitors";

/// Response with the service's health.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Whether the service considers itself healthy.
    pub is_healthy: bool,
    /// Whether the database answered; only probed for signed-in callers.
    pub database: Option<bool>,

    /// Timestamp when the check ran.
    #[schema(value_type = String, format = DateTime)]
    pub checked_at: Timestamp,
}

/// Returns the service's health.
///
/// Anonymous callers get a bare liveness answer. Signed-in callers also get
/// a database round-trip, and a failed one turns the whole response
/// unhealthy.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/health", tag = "health",
    responses(
        (
            status = SERVICE_UNAVAILABLE,
            description = "The database did not answer",
            body = HealthResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Service is healthy",
            body = HealthResponse,
        ),
    ),
)]
async fn get_health(
    State(pg_client): State<PgClient>,
    auth_state: Option<AuthState>,
) -> Result<(StatusCode, Json<HealthResponse>)> {
    let database = match &auth_state {
        Some(_) => Some(pg_client.get_connection().await.is_ok()),
        None => None,
    };

    let is_healthy = database.unwrap_or(true);
    if !is_healthy {
        tracing::error!(target: TRACING_TARGET, "health check failed to reach postgres");
    }

    let response = HealthResponse {
        is_healthy,
        database,
        checked_at: Timestamp::now(),
    };

    let status = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status, Json(response)))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get_health))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::test::{create_test_server, sign_up_account};

    #[tokio::test]
    async fn health_answers_anonymously() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let health: HealthResponse = response.json();
        assert!(health.is_healthy);
        assert!(health.database.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn health_probes_the_database_for_signed_in_callers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/health")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();

        let health: HealthResponse = response.json();
        assert!(health.is_healthy);
        assert_eq!(health.database, Some(true));

        Ok(())
    }
}
