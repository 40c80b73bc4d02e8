//! HTTP server for the on-demand trigger and metrics endpoints.

use crate::server::Pipeline;
use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// HTTP server exposing the on-demand trigger
pub struct TriggerServer {
    /// Shared cycle pipeline
    pipeline: Arc<Pipeline>,
    /// Listen address
    listen_addr: String,
    /// Whether /metrics is exposed
    metrics_enabled: bool,
}

impl TriggerServer {
    /// Create a new trigger server
    pub fn new(pipeline: Arc<Pipeline>, listen_addr: String, metrics_enabled: bool) -> Self {
        Self {
            pipeline,
            listen_addr,
            metrics_enabled,
        }
    }

    /// Build the router
    pub fn router(pipeline: Arc<Pipeline>, metrics_enabled: bool) -> Router {
        let mut router =
            Router::new().route("/trigger", get(trigger_handler).post(trigger_handler));

        if metrics_enabled {
            router = router.route("/metrics", get(metrics_handler));
        }

        router
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(pipeline)
    }

    /// Run the HTTP server
    pub async fn run(self) -> common::Result<()> {
        info!(listen_addr = %self.listen_addr, "Starting trigger HTTP server");

        let app = Self::router(self.pipeline, self.metrics_enabled);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        info!(listen_addr = %self.listen_addr, "Trigger server listening");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Handler for the on-demand trigger.
///
/// Runs one full cycle and answers with the summary, or a 500 with the
/// error description when the cycle aborts. A response is always
/// produced.
async fn trigger_handler(method: Method, State(pipeline): State<Arc<Pipeline>>) -> Response {
    info!(
        event = "http_request",
        method = %method,
        path = "/trigger",
        "Manual cycle requested"
    );

    match pipeline.run().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            let message = e.to_string();
            error!(event = "http_error", error = %message, "Manual cycle failed");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}

/// Handler for /metrics endpoint
async fn metrics_handler(State(pipeline): State<Arc<Pipeline>>) -> Response {
    // Encode metrics to Prometheus text format
    let mut buffer = String::new();
    if let Err(e) = encode(&mut buffer, &pipeline.metrics().registry) {
        warn!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response();
    }

    // Return with correct content type
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
        .into_response()
}
