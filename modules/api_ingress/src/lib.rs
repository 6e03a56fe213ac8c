//! HTTP host: owns the listener, the shared middleware stack and the
//! merged OpenAPI document. Modules hand in their routers already wired to
//! their services.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::OpenApi;

mod config;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use openapi::build_openapi;

pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap module routes with health, docs and the middleware stack.
    pub fn build_router(&self, routes: Router, openapi: OpenApi) -> Router {
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes)
            .fallback(web::not_found);

        if self.config.enable_docs {
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let doc = openapi.clone();
                        async move { Json(doc) }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        // Router::layer wraps what is already there, so layers go innermost first.
        // Outermost to innermost:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> CORS -> BodyLimit
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::new(self.config.request_timeout));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        router
    }

    /// Bind `bind_addr` and serve until `cancel` fires.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.config.bind_addr))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        serve_on(listener, router, cancel).await
    }
}

/// Serve on an already bound listener with graceful shutdown.
pub async fn serve_on(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "HTTP server bound");

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
