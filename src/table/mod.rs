//! Parsed tabular input model
//!
//! The graph derivation transform consumes an already-parsed table: an
//! ordered list of column names plus ordered rows of raw string cells. The
//! positional schema is an explicit contract rather than an implicit one:
//! the first column is the feed name, the last column is the feed full
//! title, and everything between is a legacy warehouse column. Tables with
//! fewer than two columns are rejected rather than silently misread.

pub mod source;

use crate::core::error::TableError;

/// Positional column contract of the input table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Name of the feed-name column (first)
    pub feed: String,
    /// Name of the feed-full-title column (last)
    pub title: String,
    /// Warehouse column names, in table order (everything between)
    pub warehouses: Vec<String>,
}

impl TableSchema {
    /// Derive the schema from an ordered column list
    pub fn from_columns(columns: &[String]) -> Result<Self, TableError> {
        if columns.len() < 2 {
            return Err(TableError::TooFewColumns { found: columns.len() });
        }
        Ok(Self {
            feed: columns[0].clone(),
            title: columns[columns.len() - 1].clone(),
            warehouses: columns[1..columns.len() - 1].to_vec(),
        })
    }
}

/// One parsed input table
///
/// Rows are stored aligned with the column order; cells missing from a row
/// are normalized to the empty string at construction.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    schema: TableSchema,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from an ordered column list and ordered rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let schema = TableSchema::from_columns(&columns)?;
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Ok(Self { columns, schema, rows })
    }

    /// The positional schema of this table
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw feed-name cell of `row` (must be `< row_count()`)
    pub fn feed_name(&self, row: usize) -> &str {
        &self.rows[row][0]
    }

    /// Raw full-title cell of `row` (must be `< row_count()`)
    pub fn full_title(&self, row: usize) -> &str {
        &self.rows[row][self.columns.len() - 1]
    }

    /// Raw connectivity cell of `row` for the warehouse column at
    /// `warehouse` (both indices zero-based, in table order)
    pub fn connectivity_cell(&self, row: usize, warehouse: usize) -> &str {
        &self.rows[row][1 + warehouse]
    }
}
