//! Cell identifier, edge identity, and cell record types.
//!
//! A cell is a triangular region named by exactly three node ids, wound to a
//! single rotation sense. Its three boundary edges are identified by
//! `EdgeKey`s, which are unordered so that edge identity never depends on
//! traversal direction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::node::NodeId;

/// Stable cell identifier.
///
/// This ID remains valid even after other cells are removed from the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl CellId {
    /// Create a new CellId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({})", self.0)
    }
}

impl From<u32> for CellId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<CellId> for u32 {
    #[inline]
    fn from(id: CellId) -> Self {
        id.0
    }
}

/// Orientation-independent identity of an undirected edge.
///
/// The two endpoint ids are stored in sorted order, so `EdgeKey::new(a, b)`
/// and `EdgeKey::new(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    /// Create the key for the edge between two nodes, in either order.
    #[inline]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The lower endpoint id.
    #[inline]
    pub fn a(self) -> NodeId {
        self.0
    }

    /// The higher endpoint id.
    #[inline]
    pub fn b(self) -> NodeId {
        self.1
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({}-{})", self.0 .0, self.1 .0)
    }
}

/// A triangular region of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// The cell identifier.
    pub id: CellId,
    /// The three member node ids, consistently wound.
    pub rels: [NodeId; 3],
    /// Opaque caller payload, round-tripped through `GridData`.
    pub data: Option<Value>,
}

impl GridCell {
    /// Create a new cell record. Callers are responsible for winding.
    pub fn new(id: CellId, rels: [NodeId; 3]) -> Self {
        Self { id, rels, data: None }
    }

    /// The three boundary edge identities derived from `rels`.
    pub fn edges(&self) -> [EdgeKey; 3] {
        [
            EdgeKey::new(self.rels[0], self.rels[1]),
            EdgeKey::new(self.rels[1], self.rels[2]),
            EdgeKey::new(self.rels[2], self.rels[0]),
        ]
    }

    /// Whether one of the cell's boundary edges has the given identity.
    #[inline]
    pub fn has_edge(&self, key: EdgeKey) -> bool {
        self.edges().contains(&key)
    }

    /// Whether the given node is one of the cell's vertices.
    #[inline]
    pub fn has_node(&self, id: NodeId) -> bool {
        self.rels.contains(&id)
    }

    /// The cell's node set in sorted order, used for order-insensitive
    /// identity ("the same three nodes" names the same cell).
    pub fn key(&self) -> [NodeId; 3] {
        Self::key_for(self.rels)
    }

    /// Sorted node-set key for an arbitrary rels triple.
    pub fn key_for(rels: [NodeId; 3]) -> [NodeId; 3] {
        let mut key = rels;
        key.sort();
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_id() {
        let id = CellId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Cell(42)");
    }

    #[test]
    fn test_edge_key_unordered() {
        let a = NodeId(3);
        let b = NodeId(7);
        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        assert_eq!(EdgeKey::new(a, b).a(), a);
        assert_eq!(EdgeKey::new(a, b).b(), b);
        assert_eq!(format!("{}", EdgeKey::new(b, a)), "Edge(3-7)");
    }

    #[test]
    fn test_cell_edges() {
        let cell = GridCell::new(CellId(0), [NodeId(1), NodeId(2), NodeId(3)]);
        let edges = cell.edges();
        assert!(edges.contains(&EdgeKey::new(NodeId(2), NodeId(1))));
        assert!(edges.contains(&EdgeKey::new(NodeId(3), NodeId(2))));
        assert!(edges.contains(&EdgeKey::new(NodeId(1), NodeId(3))));
        assert!(!cell.has_edge(EdgeKey::new(NodeId(1), NodeId(4))));
    }

    #[test]
    fn test_cell_key_ignores_order() {
        let a = GridCell::new(CellId(0), [NodeId(3), NodeId(1), NodeId(2)]);
        let b = GridCell::new(CellId(1), [NodeId(2), NodeId(3), NodeId(1)]);
        assert_eq!(a.key(), b.key());
    }
}
