//! # API Module
//!
//! HTTP interface for the lineage visualizer:
//!
//! - `GET /` - visualization page with the snapshot JSON injected
//! - `GET /api/v1/graphs` - the three snapshots as JSON
//! - `GET /api/v1/health` - health check
//! - `GET /api/v1/diagnostics` - recent transform diagnostics
//! - `GET /metrics` - Prometheus exposition
//! - `GET /static/*` - static assets

pub mod handlers;
pub mod server;

// Re-export commonly used items
pub use server::{create_app, start_server, AppState};
