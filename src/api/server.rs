//! HTTP server for the lineage visualizer

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use minijinja::{path_loader, syntax::SyntaxConfig, Environment};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::core::config::Config;
use crate::core::diagnostics::DiagnosticsBuffer;
use crate::core::error::Result;

/// Shared state for all request handlers
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Ring buffer of recent transform diagnostics
    pub diagnostics: Arc<DiagnosticsBuffer>,
    /// Template environment for the visualization page
    pub templates: Environment<'static>,
}

impl AppState {
    /// Build the shared state from configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let mut templates = Environment::new();
        templates.set_loader(path_loader(&config.server.templates_dir));
        // [[ .. ]] variable delimiters keep the injected JSON clear of the
        // curly braces in the page's client-side scripts
        templates.set_syntax(
            SyntaxConfig::builder()
                .variable_delimiters("[[", "]]")
                .build()?,
        );

        let diagnostics = Arc::new(DiagnosticsBuffer::new(config.diagnostics.capacity));

        Ok(Self {
            config,
            diagnostics,
            templates,
        })
    }
}

/// Creates the application router with all routes and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        // Visualization page
        .route("/", get(handlers::index))
        // Snapshot and system routes
        .route("/api/v1/graphs", get(handlers::graphs))
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/diagnostics", get(handlers::diagnostics))
        .route("/metrics", get(handlers::metrics_export))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server; serves until `shutdown` resolves
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    tracing::info!("Starting lineage visualizer server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Visualization available at http://{}/", addr);
    tracing::info!("Snapshot JSON available at http://{}/api/v1/graphs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
