//! The graph-derivation transform
//!
//! One invocation reads the parsed table and produces all three snapshots.
//! The work splits into two halves: identifier assignment plus node
//! materialization (feeds in table order, warehouse columns in table order,
//! then the fixed roster of data lake, virtualisation layer, and logical
//! warehouses), and per-snapshot edge derivation. The transform is a pure
//! function of the table, the options, and fixed constants; it never fails,
//! it only reports anomalies through the injected sink.

use tracing::{debug, warn};

use crate::core::config::TransformConfig;
use crate::core::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::system::metrics::Metrics;
use crate::table::Table;

use super::ids::{feed_key, normalise, IdRegistry};
use super::model::{Edge, GraphSnapshot, Node, NodeGroup, Snapshots};

/// Stable key of the data lake node
const DATA_LAKE_KEY: &str = "dl";
/// Stable key of the virtualisation node
const VIRTUALISATION_KEY: &str = "dv";
/// Logical warehouse roster: stable key and domain, in fixed order
const LOGICAL_DOMAINS: [(&str, &str); 3] =
    [("ldw1", "Sales"), ("ldw2", "Marketing"), ("ldw3", "Finance")];
/// The warehouse circle grows with the number of warehouse columns
const RADIUS_PER_WAREHOUSE: f64 = 50.0;

/// Interpretation of one raw connectivity cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connectivity {
    Connected,
    NotConnected,
    Anomalous,
}

fn interpret_cell(raw: &str) -> Connectivity {
    match raw.trim().to_uppercase().as_str() {
        "Y" => Connectivity::Connected,
        "N" | "0" | "" => Connectivity::NotConnected,
        _ => Connectivity::Anomalous,
    }
}

/// Every node of one run, grouped by category
struct NodeRoster {
    feeds: Vec<Node>,
    warehouses: Vec<Node>,
    lake: Node,
    virtualisation: Node,
    logical: Vec<Node>,
}

/// Advisory position on the warehouse circle; `count` must be non-zero
fn circle_position(index: usize, count: usize) -> (i64, i64) {
    let radius = RADIUS_PER_WAREHOUSE * count as f64;
    let theta = std::f64::consts::TAU * index as f64 / count as f64;
    (
        (radius * theta.cos()).round() as i64,
        (radius * theta.sin()).round() as i64,
    )
}

/// Identifier assignment and node materialization
///
/// Mint order fixes the id counter sequence: feed rows, warehouse columns,
/// data lake, virtualisation, logical warehouses. Rows with a blank feed
/// name are skipped entirely; no id is registered for them.
fn materialise_nodes(
    table: &Table,
    options: &TransformConfig,
    registry: &mut IdRegistry,
) -> NodeRoster {
    let metrics = Metrics::global();

    let mut feeds = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let name = table.feed_name(row).trim();
        if name.is_empty() {
            debug!(row, "skipping row with blank feed name");
            metrics.transform.rows_skipped.inc();
            continue;
        }
        let id = registry.mint(feed_key(row), name);
        let full_title = table.full_title(row).trim();
        let tooltip = if full_title.is_empty() {
            format!("Feed: {name}")
        } else {
            format!("Feed: {full_title}")
        };
        feeds.push(Node::new(id, name, NodeGroup::Feed, tooltip));
    }

    let warehouse_names = &table.schema().warehouses;
    let mut warehouses = Vec::with_capacity(warehouse_names.len());
    for (index, name) in warehouse_names.iter().enumerate() {
        let id = registry.mint(normalise(name), name);
        let mut node = Node::new(
            id,
            name.as_str(),
            NodeGroup::Warehouse,
            format!("Legacy Warehouse: {name}"),
        );
        if options.layout_hints {
            let (x, y) = circle_position(index, warehouse_names.len());
            node = node.with_position(x, y);
        }
        warehouses.push(node);
    }

    let lake = Node::new(
        registry.mint(DATA_LAKE_KEY, "Data Lake"),
        "Data Lake",
        NodeGroup::Datalake,
        "Central Data Lake",
    );
    let virtualisation = Node::new(
        registry.mint(VIRTUALISATION_KEY, "Data Virtualisation"),
        "Data Virtualisation",
        NodeGroup::Virtualisation,
        "Data Virtualisation Layer",
    );
    let logical = LOGICAL_DOMAINS
        .iter()
        .map(|(key, domain)| {
            let label = format!("LDW: {domain}");
            Node::new(
                registry.mint(*key, &label),
                label.as_str(),
                NodeGroup::LogicalDw,
                format!("Logical DW for {domain}"),
            )
        })
        .collect();

    NodeRoster {
        feeds,
        warehouses,
        lake,
        virtualisation,
        logical,
    }
}

/// Feed-to-warehouse edges for the "past" snapshot
///
/// Row-major order: outer loop over surviving rows, inner loop over
/// warehouse columns in table order. Presence in the registry is the sole
/// gate for row participation; a warehouse column missing from the registry
/// would mean node and edge construction disagree, so it is guarded rather
/// than assumed.
fn derive_past_edges(table: &Table, registry: &IdRegistry, sink: &dyn DiagnosticsSink) -> Vec<Edge> {
    let metrics = Metrics::global();
    let mut edges = Vec::new();

    for row in 0..table.row_count() {
        let Some(feed_id) = registry.resolve(&feed_key(row)) else {
            continue;
        };
        for (index, name) in table.schema().warehouses.iter().enumerate() {
            let raw = table.connectivity_cell(row, index);
            match interpret_cell(raw) {
                Connectivity::Connected => {
                    if let Some(warehouse_id) = registry.resolve(&normalise(name)) {
                        edges.push(Edge::new(feed_id, warehouse_id));
                    }
                }
                Connectivity::NotConnected => {}
                Connectivity::Anomalous => {
                    warn!(
                        row,
                        column = %name,
                        value = raw,
                        "unexpected connectivity value, treating as not connected"
                    );
                    metrics.transform.anomalous_cells.inc();
                    sink.record(DiagnosticEvent::anomalous_cell(row, name, raw));
                }
            }
        }
    }

    edges
}

/// Derive the three snapshots from one parsed table
///
/// All identifier state is local to this call; concurrent invocations never
/// interleave id assignment.
pub fn derive_snapshots(
    table: &Table,
    options: &TransformConfig,
    sink: &dyn DiagnosticsSink,
) -> Snapshots {
    let metrics = Metrics::global();
    metrics.transform.runs.inc();

    let mut registry = IdRegistry::new();
    let roster = materialise_nodes(table, options, &mut registry);
    let past_edges = derive_past_edges(table, &registry, sink);

    // Past: feeds load straight into the legacy warehouses.
    let mut past_nodes = roster.feeds.clone();
    past_nodes.extend(roster.warehouses.iter().cloned());
    let past = GraphSnapshot {
        nodes: past_nodes,
        edges: past_edges.clone(),
    };

    // Current: the first configured warehouses are served through the
    // virtualisation layer; the data lake does not exist yet.
    let mut current_nodes = roster.feeds.clone();
    current_nodes.extend(roster.warehouses.iter().cloned());
    current_nodes.push(roster.virtualisation.clone());
    current_nodes.extend(roster.logical.iter().cloned());

    let mut current_edges = past_edges;
    for name in table
        .schema()
        .warehouses
        .iter()
        .take(options.virtualise_first)
    {
        if let Some(warehouse_id) = registry.resolve(&normalise(name)) {
            current_edges.push(Edge::new(warehouse_id, roster.virtualisation.id.as_str()));
        }
    }
    for logical in &roster.logical {
        current_edges.push(Edge::new(
            roster.virtualisation.id.as_str(),
            logical.id.as_str(),
        ));
    }
    let current = GraphSnapshot {
        nodes: current_nodes,
        edges: current_edges,
    };

    // Future: the legacy layer is retired; every feed loads the data lake.
    let mut future_nodes = roster.feeds.clone();
    future_nodes.push(roster.lake.clone());
    future_nodes.push(roster.virtualisation.clone());
    future_nodes.extend(roster.logical.iter().cloned());

    let mut future_edges: Vec<Edge> = roster
        .feeds
        .iter()
        .map(|feed| Edge::new(feed.id.as_str(), roster.lake.id.as_str()))
        .collect();
    future_edges.push(Edge::new(
        roster.lake.id.as_str(),
        roster.virtualisation.id.as_str(),
    ));
    for logical in &roster.logical {
        future_edges.push(Edge::new(
            roster.virtualisation.id.as_str(),
            logical.id.as_str(),
        ));
    }
    let future = GraphSnapshot {
        nodes: future_nodes,
        edges: future_edges,
    };

    let node_total = past.nodes.len() + current.nodes.len() + future.nodes.len();
    let edge_total = past.edges.len() + current.edges.len() + future.edges.len();
    metrics.transform.nodes_built.inc_by(node_total as u64);
    metrics.transform.edges_built.inc_by(edge_total as u64);

    Snapshots {
        past,
        current,
        future,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::DiagnosticsBuffer;
    use crate::graph::model::PLACEHOLDER_LABEL;
    use std::collections::{HashMap, HashSet};

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn options() -> TransformConfig {
        TransformConfig::default()
    }

    fn derive(table: &Table) -> Snapshots {
        derive_snapshots(table, &options(), &DiagnosticsBuffer::new(64))
    }

    fn assert_no_dangling(snapshot: &GraphSnapshot) {
        let ids: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &snapshot.edges {
            assert!(ids.contains(edge.source.as_str()), "dangling source {}", edge.source);
            assert!(ids.contains(edge.target.as_str()), "dangling target {}", edge.target);
        }
    }

    fn example_table() -> Table {
        table(
            &["Feed ID", "Data Warehouse 1", "Data Warehouse 2", "Feed Full Title"],
            &[&["F1", "Y", "", "Feed One"]],
        )
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let input = example_table();
        let first = derive(&input);
        let second = derive(&input);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn ids_are_unique_within_a_run() {
        let snapshots = derive(&table(
            &["Feed ID", "Data Warehouse 1", "Data Warehouse 1", "Feed Full Title"],
            &[&["F1", "Y", "Y", "One"], &["F1", "N", "Y", "Same name"]],
        ));

        // The same id may appear in several snapshots, but it must always
        // denote the same node, and never repeat within one roster.
        let mut seen: HashMap<&str, (&str, NodeGroup)> = HashMap::new();
        for snapshot in [&snapshots.past, &snapshots.current, &snapshots.future] {
            let mut roster_ids = HashSet::new();
            for node in &snapshot.nodes {
                assert!(roster_ids.insert(node.id.as_str()), "duplicate id {}", node.id);
                let entry = seen.entry(node.id.as_str()).or_insert((node.label.as_str(), node.group));
                assert_eq!(*entry, (node.label.as_str(), node.group));
            }
        }
    }

    #[test]
    fn no_snapshot_has_dangling_edges() {
        let snapshots = derive(&table(
            &["Feed ID", "Data Warehouse 1", "Data Warehouse 2", "Feed Full Title"],
            &[
                &["F1", "Y", "N", "One"],
                &["", "Y", "Y", "Blank feed"],
                &["F3", "Maybe", "Y", "Three"],
            ],
        ));
        assert_no_dangling(&snapshots.past);
        assert_no_dangling(&snapshots.current);
        assert_no_dangling(&snapshots.future);
    }

    #[test]
    fn blank_feed_rows_contribute_nothing() {
        let snapshots = derive(&table(
            &["Feed ID", "Data Warehouse 1", "Feed Full Title"],
            &[&["   ", "Y", "Ghost"], &["F2", "Y", "Two"]],
        ));

        let feed_labels: Vec<&str> = snapshots
            .past
            .nodes
            .iter()
            .filter(|n| n.group == NodeGroup::Feed)
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(feed_labels, vec!["F2"]);

        // The surviving row takes counter position 0; the skipped row
        // registered nothing.
        assert_eq!(snapshots.past.nodes[0].id, "0-F2");
        assert_eq!(snapshots.past.edges.len(), 1);
        assert_eq!(snapshots.past.edges[0].source, "0-F2");
    }

    #[test]
    fn anomalous_cells_default_to_not_connected_and_are_reported() {
        let sink = DiagnosticsBuffer::new(16);
        let input = table(
            &["Feed ID", "Data Warehouse 1", "Data Warehouse 2", "Feed Full Title"],
            &[&["F1", "Maybe", "Y", "One"]],
        );
        let snapshots = derive_snapshots(&input, &options(), &sink);

        // The malformed cell produced no edge, the valid one still did.
        assert_eq!(snapshots.past.edges.len(), 1);
        assert_eq!(snapshots.past.edges[0].target, "2-Data_Warehouse_2");

        let events = sink.recent();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].row, Some(0));
        assert_eq!(events[0].column.as_deref(), Some("Data Warehouse 1"));
        assert_eq!(events[0].value.as_deref(), Some("Maybe"));
    }

    #[test]
    fn connectivity_interpretation() {
        assert_eq!(interpret_cell("Y"), Connectivity::Connected);
        assert_eq!(interpret_cell(" y "), Connectivity::Connected);
        assert_eq!(interpret_cell("N"), Connectivity::NotConnected);
        assert_eq!(interpret_cell("n"), Connectivity::NotConnected);
        assert_eq!(interpret_cell("0"), Connectivity::NotConnected);
        assert_eq!(interpret_cell(""), Connectivity::NotConnected);
        assert_eq!(interpret_cell("   "), Connectivity::NotConnected);
        assert_eq!(interpret_cell("Maybe"), Connectivity::Anomalous);
        assert_eq!(interpret_cell("1"), Connectivity::Anomalous);
    }

    #[test]
    fn current_extends_past_with_virtualisation_layer() {
        let snapshots = derive(&table(
            &["Feed ID", "Data Warehouse 1", "Data Warehouse 2", "Feed Full Title"],
            &[&["F1", "Y", "N", "One"]],
        ));

        let past_len = snapshots.past.nodes.len();
        assert_eq!(&snapshots.current.nodes[..past_len], &snapshots.past.nodes[..]);

        let added: Vec<NodeGroup> = snapshots.current.nodes[past_len..]
            .iter()
            .map(|n| n.group)
            .collect();
        assert_eq!(
            added,
            vec![
                NodeGroup::Virtualisation,
                NodeGroup::LogicalDw,
                NodeGroup::LogicalDw,
                NodeGroup::LogicalDw,
            ]
        );
        assert!(!snapshots
            .current
            .nodes
            .iter()
            .any(|n| n.group == NodeGroup::Datalake));
    }

    #[test]
    fn future_retires_the_warehouse_layer() {
        let snapshots = derive(&table(
            &["Feed ID", "Data Warehouse 1", "Data Warehouse 2", "Feed Full Title"],
            &[&["F1", "Y", "N", "One"], &["F2", "N", "Y", "Two"]],
        ));

        assert!(!snapshots
            .future
            .nodes
            .iter()
            .any(|n| n.group == NodeGroup::Warehouse));

        let groups: Vec<NodeGroup> = snapshots.future.nodes.iter().map(|n| n.group).collect();
        assert_eq!(
            groups,
            vec![
                NodeGroup::Feed,
                NodeGroup::Feed,
                NodeGroup::Datalake,
                NodeGroup::Virtualisation,
                NodeGroup::LogicalDw,
                NodeGroup::LogicalDw,
                NodeGroup::LogicalDw,
            ]
        );
    }

    #[test]
    fn end_to_end_single_row_example() {
        let snapshots = derive(&example_table());

        // Past: the feed plus both warehouse columns, one connected edge.
        let past = &snapshots.past;
        assert_eq!(past.nodes.len(), 3);
        assert_eq!(past.nodes[0].id, "0-F1");
        assert_eq!(past.nodes[1].id, "1-Data_Warehouse_1");
        assert_eq!(past.nodes[2].id, "2-Data_Warehouse_2");
        assert_eq!(past.edges, vec![Edge::new("0-F1", "1-Data_Warehouse_1")]);

        // Current: virtualisation and the logical warehouses join; both
        // warehouses are within the first-four policy window.
        let current = &snapshots.current;
        assert_eq!(current.nodes.len(), 7);
        assert_eq!(
            current.edges,
            vec![
                Edge::new("0-F1", "1-Data_Warehouse_1"),
                Edge::new("1-Data_Warehouse_1", "4-Data_Virtualisation"),
                Edge::new("2-Data_Warehouse_2", "4-Data_Virtualisation"),
                Edge::new("4-Data_Virtualisation", "5-LDW:_Sales"),
                Edge::new("4-Data_Virtualisation", "6-LDW:_Marketing"),
                Edge::new("4-Data_Virtualisation", "7-LDW:_Finance"),
            ]
        );

        // Future: feed, lake, virtualisation, logical warehouses.
        let future = &snapshots.future;
        assert_eq!(future.nodes.len(), 6);
        assert_eq!(
            future.edges,
            vec![
                Edge::new("0-F1", "3-Data_Lake"),
                Edge::new("3-Data_Lake", "4-Data_Virtualisation"),
                Edge::new("4-Data_Virtualisation", "5-LDW:_Sales"),
                Edge::new("4-Data_Virtualisation", "6-LDW:_Marketing"),
                Edge::new("4-Data_Virtualisation", "7-LDW:_Finance"),
            ]
        );

        // Tooltips come from the full title when present.
        assert_eq!(past.nodes[0].title.as_deref(), Some("Feed: Feed One"));
        assert_eq!(
            past.nodes[1].title.as_deref(),
            Some("Legacy Warehouse: Data Warehouse 1")
        );
    }

    #[test]
    fn empty_warehouse_list_is_handled() {
        let snapshots = derive(&table(
            &["Feed ID", "Feed Full Title"],
            &[&["F1", "Feed One"]],
        ));

        assert_eq!(snapshots.past.nodes.len(), 1);
        assert!(snapshots.past.edges.is_empty());

        // No warehouse nodes anywhere, so no virtualised-warehouse edges.
        assert_eq!(snapshots.current.nodes.len(), 5);
        assert_eq!(snapshots.current.edges.len(), 3);
        assert_eq!(snapshots.future.edges.len(), 5);
    }

    #[test]
    fn virtualise_first_is_honoured() {
        let mut opts = options();
        opts.virtualise_first = 2;
        let input = table(
            &[
                "Feed ID",
                "Data Warehouse 1",
                "Data Warehouse 2",
                "Data Warehouse 3",
                "Feed Full Title",
            ],
            &[&["F1", "N", "N", "N", "One"]],
        );
        let snapshots = derive_snapshots(&input, &opts, &DiagnosticsBuffer::new(8));

        let virtualised: Vec<&str> = snapshots
            .current
            .edges
            .iter()
            .filter(|e| e.target.ends_with("Data_Virtualisation"))
            .map(|e| e.source.as_str())
            .collect();
        assert_eq!(virtualised, vec!["1-Data_Warehouse_1", "2-Data_Warehouse_2"]);
    }

    #[test]
    fn warehouse_positions_lie_on_the_circle() {
        let snapshots = derive(&table(
            &[
                "Feed ID",
                "Data Warehouse 1",
                "Data Warehouse 2",
                "Data Warehouse 3",
                "Data Warehouse 4",
                "Feed Full Title",
            ],
            &[&["F1", "Y", "", "", "", "One"]],
        ));

        let warehouses: Vec<&Node> = snapshots
            .past
            .nodes
            .iter()
            .filter(|n| n.group == NodeGroup::Warehouse)
            .collect();
        assert_eq!(warehouses.len(), 4);
        // radius = 50 * 4 = 200, quarter turns
        assert_eq!((warehouses[0].x, warehouses[0].y), (Some(200), Some(0)));
        assert_eq!((warehouses[1].x, warehouses[1].y), (Some(0), Some(200)));
        assert_eq!((warehouses[2].x, warehouses[2].y), (Some(-200), Some(0)));
        assert_eq!((warehouses[3].x, warehouses[3].y), (Some(0), Some(-200)));

        // Feeds carry no position hints.
        assert!(snapshots.past.nodes[0].x.is_none());
    }

    #[test]
    fn layout_hints_can_be_disabled() {
        let mut opts = options();
        opts.layout_hints = false;
        let snapshots = derive_snapshots(
            &table(
                &["Feed ID", "Data Warehouse 1", "Feed Full Title"],
                &[&["F1", "Y", "One"]],
            ),
            &opts,
            &DiagnosticsBuffer::new(8),
        );
        assert!(snapshots.past.nodes.iter().all(|n| n.x.is_none() && n.y.is_none()));
    }

    #[test]
    fn blank_warehouse_name_gets_placeholder_label() {
        let snapshots = derive(&table(
            &["Feed ID", "", "Feed Full Title"],
            &[&["F1", "Y", "One"]],
        ));
        let warehouse = snapshots
            .past
            .nodes
            .iter()
            .find(|n| n.group == NodeGroup::Warehouse)
            .unwrap();
        assert_eq!(warehouse.label, PLACEHOLDER_LABEL);
    }

    #[test]
    fn blank_full_title_falls_back_to_feed_name() {
        let snapshots = derive(&table(
            &["Feed ID", "Data Warehouse 1", "Feed Full Title"],
            &[&["F1", "Y", "  "]],
        ));
        assert_eq!(snapshots.past.nodes[0].title.as_deref(), Some("Feed: F1"));
    }
}
