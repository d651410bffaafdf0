//! Wire model for graph snapshots
//!
//! These shapes serialize directly to the JSON consumed by the browser
//! renderer. Edges keep `source`/`target` internally but serialize under
//! the `from`/`to` keys the renderer expects; optional node fields are
//! omitted when absent, never emitted as null.

use serde::Serialize;

/// Substituted when a source value would leave a node label blank
pub const PLACEHOLDER_LABEL: &str = "Unknown";

/// Display category of a node
///
/// The group fixes the node's layer rank and its display color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeGroup {
    /// Upstream data source
    Feed,
    /// Legacy destination system
    Warehouse,
    /// Centralized ingestion target
    Datalake,
    /// Logical access layer between storage and consumption
    Virtualisation,
    /// Consumption-oriented, domain-scoped view
    LogicalDw,
}

/// Fixed background/border color pair for one node group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    /// Fill color (hex)
    pub background: &'static str,
    /// Outline color (hex)
    pub border: &'static str,
}

impl NodeGroup {
    /// Layer rank used for hierarchical layout
    pub fn level(self) -> u8 {
        match self {
            NodeGroup::Feed => 0,
            NodeGroup::Warehouse | NodeGroup::Datalake => 1,
            NodeGroup::Virtualisation => 2,
            NodeGroup::LogicalDw => 3,
        }
    }

    /// Display colors for this group
    pub fn color(self) -> ColorPair {
        match self {
            // sky-100 / sky-400
            NodeGroup::Feed => ColorPair { background: "#e0f2fe", border: "#38bdf8" },
            // orange-100 / orange-400
            NodeGroup::Warehouse => ColorPair { background: "#ffedd5", border: "#fb923c" },
            // green-100 / green-400
            NodeGroup::Datalake => ColorPair { background: "#dcfce7", border: "#4ade80" },
            // violet-100 / violet-400
            NodeGroup::Virtualisation => ColorPair { background: "#ede9fe", border: "#a78bfa" },
            // red-100 / red-400
            NodeGroup::LogicalDw => ColorPair { background: "#fee2e2", border: "#f87171" },
        }
    }
}

/// A graph vertex
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Unique id within one transform run
    pub id: String,
    /// Display label; never empty
    pub label: String,
    /// Layer rank for hierarchical layout
    pub level: u8,
    /// Display category
    pub group: NodeGroup,
    /// Hover tooltip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display colors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorPair>,
    /// Advisory horizontal position hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    /// Advisory vertical position hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
}

impl Node {
    /// Build a node of the given group, applying the label placeholder rule
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        group: NodeGroup,
        title: impl Into<String>,
    ) -> Self {
        let label = label.into();
        let label = if label.trim().is_empty() {
            PLACEHOLDER_LABEL.to_string()
        } else {
            label
        };
        Self {
            id: id.into(),
            label,
            level: group.level(),
            group,
            title: Some(title.into()),
            color: Some(group.color()),
            x: None,
            y: None,
        }
    }

    /// Attach an advisory position hint
    pub fn with_position(mut self, x: i64, y: i64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Source node id; serialized as `from` for the renderer
    #[serde(rename = "from")]
    pub source: String,
    /// Target node id; serialized as `to` for the renderer
    #[serde(rename = "to")]
    pub target: String,
}

impl Edge {
    /// Create an edge from `source` to `target`
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// One state in time: ordered nodes plus ordered edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    /// Node roster, in derivation order
    pub nodes: Vec<Node>,
    /// Edge roster, in derivation order
    pub edges: Vec<Edge>,
}

/// The three snapshots produced by one transform run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshots {
    /// Point-to-point feeds into legacy warehouses
    pub past: GraphSnapshot,
    /// Legacy warehouses partially behind the virtualisation layer
    pub current: GraphSnapshot,
    /// Legacy layer retired; feeds load the central data lake
    pub future: GraphSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_serializes_under_from_and_to() {
        let edge = Edge::new("0-F1", "1-Data_Warehouse_1");
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value, json!({ "from": "0-F1", "to": "1-Data_Warehouse_1" }));
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let node = Node {
            id: "0-F1".to_string(),
            label: "F1".to_string(),
            level: 0,
            group: NodeGroup::Feed,
            title: None,
            color: None,
            x: None,
            y: None,
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({ "id": "0-F1", "label": "F1", "level": 0, "group": "feed" })
        );
    }

    #[test]
    fn groups_serialize_snake_case() {
        assert_eq!(serde_json::to_value(NodeGroup::Datalake).unwrap(), json!("datalake"));
        assert_eq!(serde_json::to_value(NodeGroup::LogicalDw).unwrap(), json!("logical_dw"));
        assert_eq!(
            serde_json::to_value(NodeGroup::Virtualisation).unwrap(),
            json!("virtualisation")
        );
    }

    #[test]
    fn blank_label_falls_back_to_placeholder() {
        let node = Node::new("3-x", "   ", NodeGroup::Warehouse, "Legacy Warehouse: ?");
        assert_eq!(node.label, PLACEHOLDER_LABEL);
    }

    #[test]
    fn position_hint_round_trips_to_wire_fields() {
        let node = Node::new("1-W", "W", NodeGroup::Warehouse, "Legacy Warehouse: W")
            .with_position(50, 0);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["x"], json!(50));
        assert_eq!(value["y"], json!(0));
        assert_eq!(value["color"]["background"], json!("#ffedd5"));
    }
}
