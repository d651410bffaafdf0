//! Error types and handling for the lineage visualizer
//!
//! One top-level error type with domain sub-enums, optimized for clear
//! diagnostics at the serving boundary. Only input-acquisition failures are
//! fatal for a request; every other anomaly is absorbed by the transform
//! with a best-effort default and an observability signal.

use std::path::PathBuf;
use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the lineage visualizer
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input table acquisition errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Table shape violations
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while acquiring the input table
#[derive(Error, Debug)]
pub enum SourceError {
    /// No table file exists at any known location
    #[error("no usable input table; attempted: {}", format_paths(.attempted))]
    NotFound {
        /// Every path that was tried, in order
        attempted: Vec<PathBuf>,
    },

    /// The table file exists but could not be parsed
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },
}

/// Violations of the positional schema contract
#[derive(Error, Debug)]
pub enum TableError {
    /// A table needs at least a feed-name column and a full-title column
    #[error("table has {found} column(s), need at least 2 (feed name + full title)")]
    TooFewColumns {
        /// Number of columns actually present
        found: usize,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
