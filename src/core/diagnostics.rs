//! Structured diagnostics for the graph derivation transform
//!
//! The transform never aborts on bad cell data; it reports anomalies as
//! structured events through an injected sink. The serving layer owns a
//! bounded ring buffer of recent events and exposes it over HTTP, so data
//! owners can see which cells need fixing in the source table.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// Severity of a diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Something in the source table needs attention
    Warning,
}

/// One structured event emitted by the transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEvent {
    /// Event severity
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
    /// Zero-based row index in the source table, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Column name, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Offending raw cell value, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl DiagnosticEvent {
    /// Warning about a connectivity cell that is neither Y, N, 0, nor blank
    pub fn anomalous_cell(row: usize, column: &str, value: &str) -> Self {
        Self {
            severity: Severity::Warning,
            message: format!(
                "unexpected connectivity value {value:?} in column {column:?}; treated as not connected"
            ),
            row: Some(row),
            column: Some(column.to_string()),
            value: Some(value.to_string()),
        }
    }
}

/// Sink the transform writes structured events to
pub trait DiagnosticsSink: Send + Sync {
    /// Record one event
    fn record(&self, event: DiagnosticEvent);
}

/// Bounded ring buffer of recent diagnostic events
///
/// Owned by the serving layer; the transform only sees the
/// [`DiagnosticsSink`] trait.
pub struct DiagnosticsBuffer {
    capacity: usize,
    events: Mutex<VecDeque<DiagnosticEvent>>,
}

impl DiagnosticsBuffer {
    /// Create a buffer retaining at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Recent events, oldest first
    pub fn recent(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events are retained
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl DiagnosticsSink for DiagnosticsBuffer {
    fn record(&self, event: DiagnosticEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}
