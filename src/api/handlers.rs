//! HTTP request handlers for the lineage visualizer
//!
//! Every handler re-reads the input table, so edits to the source CSV show
//! up on the next refresh without a restart. The caller always gets either
//! all three snapshots or a single explicit error, never a partial result.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use minijinja::context;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::server::AppState;
use crate::core::diagnostics::DiagnosticEvent;
use crate::core::error::Result;
use crate::graph::{derive_snapshots, Snapshots};
use crate::system::metrics::{collect_metrics, Metrics};
use crate::table::source::load_table;

/// Health check payload
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Produce the three snapshots from the currently configured input table
fn build_snapshots(state: &AppState) -> Result<Snapshots> {
    let table = load_table(&state.config.data)?;
    Ok(derive_snapshots(
        &table,
        &state.config.transform,
        state.diagnostics.as_ref(),
    ))
}

fn render_index(state: &AppState) -> Result<String> {
    let snapshots = build_snapshots(state)?;
    let graph_data = serde_json::to_string(&snapshots)?;
    let template = state.templates.get_template("index.html")?;
    Ok(template.render(context! { graph_data })?)
}

/// Render the visualization page with the snapshot JSON injected
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let metrics = Metrics::global();
    match render_index(&state) {
        Ok(html) => {
            metrics.http.requests.inc();
            Html(html).into_response()
        }
        Err(err) => {
            metrics.http.failures.inc();
            error!(%err, "failed to render visualization page");
            let body = format!("<h1>Error</h1><p>{err}</p>");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
        }
    }
}

/// The three snapshots as JSON
pub async fn graphs(State(state): State<Arc<AppState>>) -> Response {
    let metrics = Metrics::global();
    match build_snapshots(&state) {
        Ok(snapshots) => {
            metrics.http.requests.inc();
            Json(snapshots).into_response()
        }
        Err(err) => {
            metrics.http.failures.inc();
            error!(%err, "failed to derive snapshots");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// Health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Recent transform diagnostics from the ring buffer, oldest first
pub async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<Vec<DiagnosticEvent>> {
    Json(state.diagnostics.recent())
}

/// Prometheus text exposition
pub async fn metrics_export() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        collect_metrics(),
    )
        .into_response()
}
