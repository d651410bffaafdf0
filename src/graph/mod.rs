//! Graph derivation
//!
//! Turns the parsed feed/warehouse table into the three snapshots of the
//! architecture: point-to-point loading into legacy warehouses ("past"),
//! partial virtualisation ("current"), and the legacy layer fully retired
//! behind a central data lake ("future").

pub mod ids;
pub mod model;
pub mod transform;

// Re-export commonly used items
pub use model::{Edge, GraphSnapshot, Node, NodeGroup, Snapshots};
pub use transform::derive_snapshots;
