//! HTTP surface for the registry.
//!
//! - `GET /metrics` - Prometheus text exposition, rebuilt per request
//! - `POST /pub` - forwards the raw body to the device
//! - `GET /health` - JSON liveness summary with current metric values

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::registry::{MetricValue, MetricsRegistry};
use crate::transport::WriteBack;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct ExporterState {
    pub registry: Arc<MetricsRegistry>,
    pub write_back: WriteBack,
}

pub fn router(state: ExporterState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/pub", post(publish_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serves until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: ExporterState,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Metrics server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

pub async fn metrics_handler(State(state): State<ExporterState>) -> Response {
    match state.registry.gather_text() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn publish_handler(
    State(state): State<ExporterState>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    match state.write_back.publish(body.to_vec()).await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthSummary {
    pub status: &'static str,
    pub metrics: usize,
    pub values: BTreeMap<String, MetricValue>,
}

pub async fn health_handler(State(state): State<ExporterState>) -> Json<HealthSummary> {
    let values = state.registry.snapshot();
    Json(HealthSummary {
        status: "ok",
        metrics: values.len(),
        values,
    })
}
