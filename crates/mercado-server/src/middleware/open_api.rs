//! OpenAPI document publishing.
//!
//! Splits the collected route documentation out of the router and serves
//! it as raw JSON plus a Scalar UI page.

use axum::{Json, Router, routing};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Carries the top-level document metadata from the package manifest.
#[derive(Debug, OpenApi)]
struct ApiDoc;

/// Paths under which the OpenAPI document is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path serving the OpenAPI document as JSON.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "openapi-json-path",
            env = "OPENAPI_JSON_PATH",
            default_value = "/api/openapi.json"
        )
    )]
    pub open_api_json: String,

    /// Path serving the Scalar documentation UI.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "scalar-ui-path",
            env = "SCALAR_UI_PATH",
            default_value = "/api/scalar"
        )
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`OpenApiRouter`] to publish the collected document.
pub trait RouterOpenApiExt<S> {
    /// Splits the document off the router and mounts the JSON and UI routes.
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for OpenApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S> {
        let (router, open_api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .merge(self)
            .split_for_parts();

        router
            .merge(Scalar::with_url(config.scalar_ui.clone(), open_api.clone()))
            .route(
                &config.open_api_json,
                routing::get(move || async move { Json(open_api) }),
            )
    }
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn the_document_and_ui_are_published() -> anyhow::Result<()> {
        let config = OpenApiConfig::default();
        let router: Router = OpenApiRouter::new().with_open_api(&config);

        let server = TestServer::new(router)?;

        let response = server.get(&config.open_api_json).await;
        response.assert_status_ok();
        let document: serde_json::Value = response.json();
        assert!(document.get("openapi").is_some());

        let response = server.get(&config.scalar_ui).await;
        response.assert_status_ok();
        assert!(!response.text().is_empty());

        Ok(())
    }
}
