//! REST exposure of the back office
//!
//! Consumes a `ServerHost` and produces the Axum `Router`: health checks,
//! sign-in routes, navigation, every registry and custom routes, wrapped in
//! request tracing and CORS.

use super::super::host::ServerHost;
use crate::auth::handlers as auth_handlers;
use crate::config::ServerConfig;
use crate::navigation;
use anyhow::{Result, anyhow};
use axum::http::HeaderValue;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes()
            .merge(auth_handlers::routes(host.sessions.clone()))
            .merge(navigation::routes(host.sessions.clone()))
            .merge(host.entity_registry.build_routes());

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .layer(Self::cors(&host.config.server)?)
            .layer(TraceLayer::new_for_http()))
    }

    /// Any origin when none is configured
    fn cors(server: &ServerConfig) -> Result<CorsLayer> {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if server.cors_origins.is_empty() {
            return Ok(layer.allow_origin(Any));
        }

        let origins = server
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| anyhow!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(layer.allow_origin(AllowOrigin::list(origins)))
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "backoffice"
        }))
    }
}
