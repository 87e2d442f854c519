//! Node identifier and record types.
//!
//! Nodes are the labeled points of the mesh. Each node has:
//! - A stable unique identifier (survives grid mutations)
//! - Position (x, y) in screen space
//! - An optional opaque payload carried through serialization
//!
//! Adjacency is not stored on the node itself; it lives in the grid's
//! undirected graph, which keeps it symmetric by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::geometry::Point;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the grid.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// An identified point of the mesh, stored as the graph node weight.
#[derive(Debug, Clone, PartialEq)]
pub struct GridNode {
    /// The node identifier.
    pub id: NodeId,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Opaque caller payload, round-tripped through `GridData`.
    pub data: Option<Value>,
}

impl GridNode {
    /// Create a new node record.
    pub fn new(id: NodeId, x: f32, y: f32) -> Self {
        Self { id, x, y, data: None }
    }

    /// Create a new node record with an opaque payload.
    pub fn with_data(id: NodeId, x: f32, y: f32, data: Option<Value>) -> Self {
        Self { id, x, y, data }
    }

    /// The node's position as a plain point.
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Euclidean distance to another node.
    #[inline]
    pub fn distance_to(&self, other: &GridNode) -> f32 {
        self.position().distance_to(&other.position())
    }
}
