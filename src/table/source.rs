//! CSV acquisition for the input table
//!
//! Loads the feed/warehouse table from the configured primary path, falling
//! back to a secondary location. A missing table at every location is the
//! one fatal error class of the system; the serving layer turns it into a
//! 500 response naming the attempted paths.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use super::Table;
use crate::core::config::DataConfig;
use crate::core::error::{Result, SourceError};

/// Load the input table from the first usable configured location
pub fn load_table(config: &DataConfig) -> Result<Table> {
    let candidates = [config.path.as_path(), config.fallback_path.as_path()];

    for path in candidates {
        if path.exists() {
            debug!(path = %path.display(), "loading input table");
            return read_csv(path);
        }
    }

    Err(SourceError::NotFound {
        attempted: candidates.iter().map(|p| p.to_path_buf()).collect(),
    }
    .into())
}

/// Parse one CSV file into a [`Table`]
///
/// The header row supplies the ordered column list; data rows may be ragged,
/// missing cells are blank-filled by the table constructor.
pub fn read_csv(path: &Path) -> Result<Table> {
    let parse_err = |source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(parse_err)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::new(columns, rows)?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        warehouses = table.schema().warehouses.len(),
        "input table loaded"
    );
    Ok(table)
}
