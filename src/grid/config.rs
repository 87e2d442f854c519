//! The serialized exchange shape and the data-integrity error type.
//!
//! `GridData` is a plain round-trippable snapshot, not a storage engine:
//! how it is persisted or transported is the surrounding application's
//! concern. Loading validates the snapshot against the mesh invariants and
//! fails hard rather than silently dropping or repairing invalid entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::cell::CellId;
use super::node::NodeId;

/// Serialized form of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    /// Neighbor node ids. Symmetry is not required in the payload; each
    /// listed pair is joined once on load.
    #[serde(default)]
    pub to: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Serialized form of a single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub id: CellId,
    /// Member node ids; must name exactly three existing nodes.
    pub rels: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Round-trippable snapshot of a whole grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridData {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub cells: Vec<CellData>,
}

/// Fatal data-integrity failures raised when loading a `GridData` snapshot.
///
/// Recoverable invalid-input conditions (unknown ids passed to mutation
/// operations) are reported through falsy returns instead and never reach
/// this type.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("node {node} lists unknown neighbor {neighbor}")]
    UnknownNeighbor { node: NodeId, neighbor: NodeId },

    #[error("cell {cell} references missing node {node}")]
    MissingCellNode { cell: CellId, node: NodeId },

    #[error("cell {cell} must reference exactly 3 nodes, got {count}")]
    CellNodeCount { cell: CellId, count: usize },

    #[error("duplicate cell id {0}")]
    DuplicateCell(CellId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_data_json_round_trip() {
        let data = GridData {
            nodes: vec![NodeData {
                id: NodeId(1),
                x: 2.5,
                y: -3.0,
                to: vec![NodeId(2)],
                data: Some(serde_json::json!({"label": "a"})),
            }],
            cells: vec![],
        };

        let text = serde_json::to_string(&data).unwrap();
        let back: GridData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_missing_fields_default() {
        let back: GridData =
            serde_json::from_str(r#"{"nodes":[{"id":7,"x":1.0,"y":2.0}]}"#).unwrap();
        assert_eq!(back.nodes[0].id, NodeId(7));
        assert!(back.nodes[0].to.is_empty());
        assert!(back.nodes[0].data.is_none());
        assert!(back.cells.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = GridError::MissingCellNode {
            cell: CellId(3),
            node: NodeId(9),
        };
        assert_eq!(err.to_string(), "cell Cell(3) references missing node Node(9)");
    }
}
