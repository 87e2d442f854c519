//! Grid - the owning mesh structure.
//!
//! The Grid stores the mesh topology using petgraph's StableUnGraph (node
//! records as weights, undirected edges as adjacency) and keeps cells in an
//! id-keyed map with a sorted-node-set index for order-insensitive cell
//! identity. Undirected edges make adjacency symmetry structural, and the
//! graph's edge iterator visits each undirected edge exactly once, which the
//! edge-scanning queries below rely on.

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::cell::{CellId, EdgeKey, GridCell};
use super::config::{CellData, GridData, GridError, NodeData};
use super::node::{GridNode, NodeId};
use crate::geometry::{
    bounding_rect_for_points, cross, hit_test_point_ring, nearest_point_to_point,
    snap_point_to_line_segment, Point, Rect,
};

/// Result of snapping a point onto the nearest grid edge.
///
/// `endpoints` names the two nodes bounding the edge the point landed on,
/// or None when the grid has no edges (in which case `point` is the input).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnappedPoint {
    pub point: Point,
    pub endpoints: Option<(NodeId, NodeId)>,
}

/// The mesh engine.
///
/// This struct manages:
/// - Node records and undirected adjacency via petgraph
/// - Triangular cells with order-insensitive identity
/// - Containment, nearest and snapping queries
/// - ID mapping between stable ids and internal indices
#[derive(Debug)]
pub struct Grid {
    /// The underlying topology. Node weights are the full node records.
    graph: StableUnGraph<GridNode, ()>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// All cells by id
    cells: HashMap<CellId, GridCell>,

    /// Sorted node-set index for cell de-duplication
    cell_key_to_id: HashMap<[NodeId; 3], CellId>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next cell ID to assign
    next_cell_id: u32,
}

impl Grid {
    /// Create a new empty grid.
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            node_id_to_index: HashMap::new(),
            cells: HashMap::new(),
            cell_key_to_id: HashMap::new(),
            next_node_id: 0,
            next_cell_id: 0,
        }
    }

    /// Create a grid from a serialized snapshot.
    pub fn from_config(data: &GridData) -> Result<Self, GridError> {
        let mut grid = Self::new();
        grid.reset(data)?;
        Ok(grid)
    }

    // =========================================================================
    // Node Mutation
    // =========================================================================

    /// Add a node at the specified position. Returns its fresh stable id.
    pub fn add_node(&mut self, x: f32, y: f32) -> NodeId {
        self.add_node_with_data(x, y, None)
    }

    /// Add a node carrying an opaque payload.
    pub fn add_node_with_data(&mut self, x: f32, y: f32, data: Option<Value>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(GridNode::with_data(id, x, y, data));
        self.node_id_to_index.insert(id, index);
        id
    }

    /// Add a node with a caller-supplied id.
    ///
    /// Returns None when the id is already taken. Fresh ids minted by
    /// [`Grid::add_node`] afterwards continue past the given id.
    pub fn add_node_with_id(&mut self, id: NodeId, x: f32, y: f32) -> Option<NodeId> {
        if self.node_id_to_index.contains_key(&id) {
            return None;
        }
        let index = self.graph.add_node(GridNode::new(id, x, y));
        self.node_id_to_index.insert(id, index);
        self.next_node_id = self.next_node_id.max(id.0 + 1);
        Some(id)
    }

    /// Connect every unordered pair among `ids`.
    ///
    /// Returns false without touching the grid unless at least two ids are
    /// given and every id resolves to an existing node. Pairs that are
    /// already connected are left alone.
    pub fn join_nodes(&mut self, ids: &[NodeId]) -> bool {
        if ids.len() < 2 || !self.has_nodes(ids) {
            return false;
        }

        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if a == b {
                    continue;
                }
                let (ai, bi) = (self.node_id_to_index[&a], self.node_id_to_index[&b]);
                if !self.graph.contains_edge(ai, bi) {
                    self.graph.add_edge(ai, bi, ());
                }
            }
        }
        true
    }

    /// Disconnect every connected pair among `ids`.
    ///
    /// Every cell riding a removed edge is deleted with it, keeping the
    /// cell/edge invariant intact. With fewer than two ids this delegates to
    /// [`Grid::detach_nodes`]. Returns whether any edge was removed.
    pub fn split_nodes(&mut self, ids: &[NodeId]) -> bool {
        if ids.len() < 2 {
            return self.detach_nodes(ids);
        }

        let mut removed = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let (Some(&ai), Some(&bi)) =
                    (self.node_id_to_index.get(&a), self.node_id_to_index.get(&b))
                else {
                    continue;
                };
                if let Some(edge) = self.graph.find_edge(ai, bi) {
                    self.graph.remove_edge(edge);
                    removed.push(EdgeKey::new(a, b));
                }
            }
        }

        for key in &removed {
            for cell_id in self.cells_with_edge(*key) {
                self.delete_cell(cell_id);
            }
        }
        !removed.is_empty()
    }

    /// Remove all adjacency edges of each given node.
    ///
    /// Cells are not touched here; cell cleanup happens on the split path or
    /// when a node is removed outright. Returns whether any edge was removed.
    pub fn detach_nodes(&mut self, ids: &[NodeId]) -> bool {
        let mut changed = false;
        for id in ids {
            let Some(&index) = self.node_id_to_index.get(id) else {
                continue;
            };
            let edges: Vec<_> = self.graph.edges(index).map(|e| e.id()).collect();
            for edge in edges {
                self.graph.remove_edge(edge);
                changed = true;
            }
        }
        changed
    }

    /// Detach and delete each given node, along with every cell that
    /// references it. Returns whether anything changed.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> bool {
        let mut changed = self.detach_nodes(ids);
        for id in ids {
            let Some(index) = self.node_id_to_index.remove(id) else {
                continue;
            };
            self.graph.remove_node(index);

            let dead: Vec<_> = self
                .cells
                .values()
                .filter(|c| c.has_node(*id))
                .map(|c| c.id)
                .collect();
            for cell_id in dead {
                self.delete_cell(cell_id);
            }
            changed = true;
        }
        changed
    }

    /// Move a node to a new position.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        if let Some(&index) = self.node_id_to_index.get(&id) {
            if let Some(node) = self.graph.node_weight_mut(index) {
                node.x = x;
                node.y = y;
            }
        }
    }

    // =========================================================================
    // Cell Mutation
    // =========================================================================

    /// Register the triangle spanned by three distinct existing nodes.
    ///
    /// The three edges are joined if absent, and the rels order is flipped
    /// when the triple is wound clockwise so every stored cell shares one
    /// rotation sense. Naming the same three nodes again (in any order)
    /// returns the existing cell's id. Returns None when fewer than three
    /// distinct ids are given or any id is unknown.
    pub fn add_cell(&mut self, rels: &[NodeId]) -> Option<CellId> {
        self.add_cell_with_data(rels, None)
    }

    /// Register a cell carrying an opaque payload.
    pub fn add_cell_with_data(&mut self, rels: &[NodeId], data: Option<Value>) -> Option<CellId> {
        let rels: [NodeId; 3] = rels.try_into().ok()?;
        if rels[0] == rels[1] || rels[1] == rels[2] || rels[0] == rels[2] {
            return None;
        }
        if !self.has_nodes(&rels) {
            return None;
        }

        let key = GridCell::key_for(rels);
        if let Some(&existing) = self.cell_key_to_id.get(&key) {
            return Some(existing);
        }

        self.join_nodes(&rels);

        let id = CellId(self.next_cell_id);
        self.next_cell_id += 1;

        let mut cell = GridCell::new(id, self.wind_rels(rels));
        cell.data = data;
        self.cell_key_to_id.insert(key, id);
        self.cells.insert(id, cell);
        Some(id)
    }

    /// Delete each existing cell id. Returns whether anything changed.
    pub fn remove_cells(&mut self, ids: &[CellId]) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.delete_cell(*id);
        }
        changed
    }

    /// Normalize a rels triple to counter-clockwise winding (screen
    /// coordinates, y-down). A collinear triple is kept as given.
    fn wind_rels(&self, rels: [NodeId; 3]) -> [NodeId; 3] {
        let points: Vec<Point> = rels
            .iter()
            .filter_map(|id| self.get_node(*id))
            .map(|n| n.position())
            .collect();
        if points.len() == 3 && cross(&points[0], &points[1], &points[2]) > 0.0 {
            [rels[2], rels[1], rels[0]]
        } else {
            rels
        }
    }

    fn delete_cell(&mut self, id: CellId) -> bool {
        let Some(cell) = self.cells.remove(&id) else {
            return false;
        };
        // Guard against a key that was re-pointed at another cell id
        if self.cell_key_to_id.get(&cell.key()) == Some(&id) {
            self.cell_key_to_id.remove(&cell.key());
        }
        true
    }

    // =========================================================================
    // Node Queries
    // =========================================================================

    /// Look up a node by id.
    pub fn get_node(&self, id: NodeId) -> Option<&GridNode> {
        self.node_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// True iff every id resolves to an existing node.
    pub fn has_nodes(&self, ids: &[NodeId]) -> bool {
        ids.iter().all(|id| self.node_id_to_index.contains_key(id))
    }

    /// All node ids, in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.node_id_to_index.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Neighbor ids of a node, in ascending order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .graph
            .neighbors(index)
            .filter_map(|n| self.graph.node_weight(n).map(|w| w.id))
            .collect();
        out.sort();
        out
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The nearest other node to the given node, or None when the grid holds
    /// fewer than two nodes or the id is unknown.
    pub fn nearest_node_to_node(&self, id: NodeId) -> Option<NodeId> {
        let target = self.get_node(id)?.position();
        if self.node_count() < 2 {
            return None;
        }
        let candidates: Vec<_> = self.node_ids().into_iter().filter(|&n| n != id).collect();
        self.nearest_of(&target, &candidates)
    }

    /// The nearest node to an arbitrary point, or None when the grid holds
    /// fewer than two nodes.
    pub fn nearest_node_to_point(&self, p: &Point) -> Option<NodeId> {
        if self.node_count() < 2 {
            return None;
        }
        self.nearest_of(p, &self.node_ids())
    }

    fn nearest_of(&self, target: &Point, candidates: &[NodeId]) -> Option<NodeId> {
        let points: Vec<Point> = candidates
            .iter()
            .filter_map(|id| self.get_node(*id))
            .map(|n| n.position())
            .collect();
        nearest_point_to_point(target, &points).map(|i| candidates[i])
    }

    /// All nodes whose coordinates satisfy the rect's hit test, ascending.
    pub fn nodes_in_rect(&self, rect: &Rect) -> Vec<NodeId> {
        self.node_ids()
            .into_iter()
            .filter(|id| {
                self.get_node(*id)
                    .is_some_and(|n| rect.hit_test(&n.position()))
            })
            .collect()
    }

    // =========================================================================
    // Cell Queries
    // =========================================================================

    /// Look up a cell by id.
    pub fn get_cell(&self, id: CellId) -> Option<&GridCell> {
        self.cells.get(&id)
    }

    /// All cell ids, in ascending order.
    pub fn cell_ids(&self) -> Vec<CellId> {
        let mut ids: Vec<_> = self.cells.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Get the number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The cell's three nodes in stored (wound) order, or empty if the cell
    /// does not exist.
    pub fn nodes_for_cell(&self, id: CellId) -> Vec<&GridNode> {
        let Some(cell) = self.cells.get(&id) else {
            return Vec::new();
        };
        cell.rels.iter().filter_map(|&n| self.get_node(n)).collect()
    }

    /// The cell's boundary ring as plain points, or empty if absent.
    pub fn ring_for_cell(&self, id: CellId) -> Vec<Point> {
        self.nodes_for_cell(id).iter().map(|n| n.position()).collect()
    }

    /// All cells whose region contains the point, ascending by id.
    ///
    /// Each cell's bounding rect is checked before the ring test.
    pub fn cells_containing_point(&self, p: &Point) -> Vec<CellId> {
        self.cell_ids()
            .into_iter()
            .filter(|id| {
                let ring = self.ring_for_cell(*id);
                bounding_rect_for_points(&ring).is_some_and(|rect| rect.hit_test(p))
                    && hit_test_point_ring(p, &ring)
            })
            .collect()
    }

    /// All nodes "in" a cell: its own vertices, plus any node falling within
    /// the cell's bounding rect and its point ring.
    pub fn nodes_in_cell(&self, id: CellId) -> Vec<NodeId> {
        let Some(cell) = self.cells.get(&id) else {
            return Vec::new();
        };
        let ring = self.ring_for_cell(id);
        let rect = bounding_rect_for_points(&ring);

        let mut out: Vec<NodeId> = cell.rels.to_vec();
        for node_id in self.node_ids() {
            if cell.has_node(node_id) {
                continue;
            }
            let Some(node) = self.get_node(node_id) else {
                continue;
            };
            let p = node.position();
            if rect.is_some_and(|r| r.hit_test(&p)) && hit_test_point_ring(&p, &ring) {
                out.push(node_id);
            }
        }
        out
    }

    /// Cells whose boundary includes the given edge, ascending by id.
    pub fn cells_with_edge(&self, key: EdgeKey) -> Vec<CellId> {
        let mut out: Vec<_> = self
            .cells
            .values()
            .filter(|c| c.has_edge(key))
            .map(|c| c.id)
            .collect();
        out.sort();
        out
    }

    /// Boundary segments shared by two cells, as node pairs in the first
    /// cell's traversal order. Segments match on unordered endpoint identity.
    pub fn adjacent_cell_segments(&self, c1: CellId, c2: CellId) -> Vec<(NodeId, NodeId)> {
        let (Some(a), Some(b)) = (self.cells.get(&c1), self.cells.get(&c2)) else {
            return Vec::new();
        };

        let mut shared = Vec::new();
        for i in 0..3 {
            let seg = (a.rels[i], a.rels[(i + 1) % 3]);
            for j in 0..3 {
                let other = (b.rels[j], b.rels[(j + 1) % 3]);
                if EdgeKey::new(seg.0, seg.1) == EdgeKey::new(other.0, other.1) {
                    shared.push(seg);
                }
            }
        }
        shared
    }

    /// Project a point onto the closest edge of the grid.
    ///
    /// Scans every undirected edge once. With no edges, the input point is
    /// returned unchanged with no endpoints.
    pub fn snap_point_to_grid(&self, p: &Point) -> SnappedPoint {
        let mut best: Option<(f32, SnappedPoint)> = None;

        for edge in self.graph.edge_references() {
            let (Some(a), Some(b)) = (
                self.graph.node_weight(edge.source()),
                self.graph.node_weight(edge.target()),
            ) else {
                continue;
            };
            let snapped = snap_point_to_line_segment(p, &a.position(), &b.position());
            let dist = p.distance_to(&snapped);
            if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                best = Some((
                    dist,
                    SnappedPoint {
                        point: snapped,
                        endpoints: Some((a.id, b.id)),
                    },
                ));
            }
        }

        best.map(|(_, s)| s).unwrap_or(SnappedPoint {
            point: *p,
            endpoints: None,
        })
    }

    // =========================================================================
    // Snapshot Round-Trip
    // =========================================================================

    /// Produce a serializable snapshot of the whole grid.
    pub fn to_config(&self) -> GridData {
        let nodes = self
            .node_ids()
            .into_iter()
            .filter_map(|id| self.get_node(id))
            .map(|n| NodeData {
                id: n.id,
                x: n.x,
                y: n.y,
                to: self.neighbors(n.id),
                data: n.data.clone(),
            })
            .collect();

        let cells = self
            .cell_ids()
            .into_iter()
            .filter_map(|id| self.cells.get(&id))
            .map(|c| CellData {
                id: c.id,
                rels: c.rels.to_vec(),
                data: c.data.clone(),
            })
            .collect();

        GridData { nodes, cells }
    }

    /// Replace the grid's contents with a snapshot.
    ///
    /// The snapshot is validated in full before it takes effect: duplicate
    /// ids, neighbors naming unknown nodes, cells whose rels name unknown
    /// nodes, and rels counts other than three are all fatal, and on failure
    /// the grid keeps its previous contents. Id counters resume past the
    /// highest loaded id.
    pub fn reset(&mut self, data: &GridData) -> Result<(), GridError> {
        let mut grid = Grid::new();

        for node in &data.nodes {
            if grid.node_id_to_index.contains_key(&node.id) {
                return Err(GridError::DuplicateNode(node.id));
            }
            let index = grid.graph.add_node(GridNode::with_data(
                node.id,
                node.x,
                node.y,
                node.data.clone(),
            ));
            grid.node_id_to_index.insert(node.id, index);
            grid.next_node_id = grid.next_node_id.max(node.id.0 + 1);
        }

        for node in &data.nodes {
            for &neighbor in &node.to {
                if !grid.node_id_to_index.contains_key(&neighbor) {
                    return Err(GridError::UnknownNeighbor {
                        node: node.id,
                        neighbor,
                    });
                }
                grid.join_nodes(&[node.id, neighbor]);
            }
        }

        for cell in &data.cells {
            if grid.cells.contains_key(&cell.id) {
                return Err(GridError::DuplicateCell(cell.id));
            }
            let rels: [NodeId; 3] =
                cell.rels
                    .as_slice()
                    .try_into()
                    .map_err(|_| GridError::CellNodeCount {
                        cell: cell.id,
                        count: cell.rels.len(),
                    })?;
            for node in rels {
                if !grid.node_id_to_index.contains_key(&node) {
                    return Err(GridError::MissingCellNode { cell: cell.id, node });
                }
            }

            grid.join_nodes(&rels);
            let mut record = GridCell::new(cell.id, grid.wind_rels(rels));
            record.data = cell.data.clone();
            grid.cell_key_to_id.entry(record.key()).or_insert(cell.id);
            grid.cells.insert(cell.id, record);
            grid.next_cell_id = grid.next_cell_id.max(cell.id.0 + 1);
        }

        *self = grid;
        Ok(())
    }

    /// Clear all nodes, edges and cells, resetting id counters.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.cells.clear();
        self.cell_key_to_id.clear();
        self.next_node_id = 0;
        self.next_cell_id = 0;
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_grid() -> (Grid, [NodeId; 3], CellId) {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(100.0, 0.0);
        let c = grid.add_node(0.0, 100.0);
        assert!(grid.join_nodes(&[a, b, c]));
        let cell = grid.add_cell(&[a, b, c]).unwrap();
        (grid, [a, b, c], cell)
    }

    #[test]
    fn test_add_and_get_node() {
        let mut grid = Grid::new();
        let id = grid.add_node(10.0, 20.0);

        assert_eq!(grid.node_count(), 1);
        let node = grid.get_node(id).unwrap();
        assert_eq!((node.x, node.y), (10.0, 20.0));
        assert_eq!(grid.get_node(NodeId(99)), None);
    }

    #[test]
    fn test_add_node_with_id() {
        let mut grid = Grid::new();
        assert_eq!(grid.add_node_with_id(NodeId(7), 1.0, 2.0), Some(NodeId(7)));
        assert_eq!(grid.add_node_with_id(NodeId(7), 9.0, 9.0), None);
        assert_eq!(grid.node_count(), 1);

        // Fresh ids continue past the explicit one
        let next = grid.add_node(3.0, 4.0);
        assert_eq!(next, NodeId(8));
        assert_eq!(
            grid.get_node(NodeId(7)).map(|n| (n.x, n.y)),
            Some((1.0, 2.0))
        );
    }

    #[test]
    fn test_grid_debug_output_names_fields() {
        let (grid, _, _) = triangle_grid();
        let dump = format!("{grid:?}");
        assert!(dump.starts_with("Grid"));
        assert!(dump.contains("cells"));

        // Fallible loads stay printable too
        let failed: Result<Grid, GridError> = Grid::from_config(&GridData {
            nodes: vec![],
            cells: vec![CellData {
                id: CellId(0),
                rels: vec![NodeId(0), NodeId(1), NodeId(2)],
                data: None,
            }],
        });
        assert!(format!("{failed:?}").contains("MissingCellNode"));
    }

    #[test]
    fn test_join_requires_known_ids() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);

        assert!(!grid.join_nodes(&[a]));
        assert!(!grid.join_nodes(&[a, NodeId(42)]));
        assert_eq!(grid.edge_count(), 0);
    }

    #[test]
    fn test_join_is_symmetric_and_idempotent() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(1.0, 0.0);
        let c = grid.add_node(0.0, 1.0);

        assert!(grid.join_nodes(&[a, b, c]));
        assert_eq!(grid.edge_count(), 3);
        for (x, y) in [(a, b), (b, c), (a, c)] {
            assert!(grid.neighbors(x).contains(&y));
            assert!(grid.neighbors(y).contains(&x));
        }

        // Re-joining adds no parallel edges
        assert!(grid.join_nodes(&[a, b, c]));
        assert_eq!(grid.edge_count(), 3);
    }

    #[test]
    fn test_split_removes_edges_and_riding_cells() {
        let (mut grid, [a, b, _c], cell) = triangle_grid();

        assert!(grid.split_nodes(&[a, b]));
        assert!(!grid.neighbors(a).contains(&b));
        assert_eq!(grid.get_cell(cell), None, "cell must not outlive its edge");

        // Splitting an unconnected pair reports no change
        assert!(!grid.split_nodes(&[a, b]));
    }

    #[test]
    fn test_split_single_id_delegates_to_detach() {
        let (mut grid, [a, b, c], _) = triangle_grid();

        assert!(grid.split_nodes(&[a]));
        assert!(grid.neighbors(a).is_empty());
        assert!(grid.neighbors(b).contains(&c));
    }

    #[test]
    fn test_detach_leaves_cells_alone() {
        let (mut grid, [a, _b, _c], cell) = triangle_grid();

        assert!(grid.detach_nodes(&[a]));
        assert!(grid.neighbors(a).is_empty());
        // Cell cleanup is the split path's job, not detach's
        assert!(grid.get_cell(cell).is_some());
    }

    #[test]
    fn test_remove_nodes_purges_cells() {
        let (mut grid, [a, b, c], cell) = triangle_grid();

        assert!(grid.remove_nodes(&[a]));
        assert_eq!(grid.node_count(), 2);
        assert_eq!(grid.get_node(a), None);
        assert_eq!(grid.get_cell(cell), None);
        assert!(grid.neighbors(b).contains(&c), "unrelated edge survives");

        assert!(!grid.remove_nodes(&[NodeId(99)]));
    }

    #[test]
    fn test_add_cell_preconditions() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(1.0, 0.0);

        assert_eq!(grid.add_cell(&[a, b]), None);
        assert_eq!(grid.add_cell(&[a, b, NodeId(77)]), None);
        assert_eq!(grid.add_cell(&[a, b, a]), None);
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn test_add_cell_joins_and_winds() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(100.0, 0.0);
        let c = grid.add_node(0.0, 100.0);

        // No pre-existing edges: add_cell joins the triangle itself
        let cell = grid.add_cell(&[a, b, c]).unwrap();
        assert_eq!(grid.edge_count(), 3);

        let rels = grid.get_cell(cell).unwrap().rels;
        let pts: Vec<Point> = rels
            .iter()
            .map(|&n| grid.get_node(n).unwrap().position())
            .collect();
        assert!(
            cross(&pts[0], &pts[1], &pts[2]) < 0.0,
            "stored rels must be counter-clockwise in screen coordinates"
        );
    }

    #[test]
    fn test_add_cell_dedups_regardless_of_order() {
        let (mut grid, [a, b, c], cell) = triangle_grid();

        assert_eq!(grid.add_cell(&[b, c, a]), Some(cell));
        assert_eq!(grid.add_cell(&[c, a, b]), Some(cell));
        assert_eq!(grid.cell_count(), 1);
    }

    #[test]
    fn test_remove_cells() {
        let (mut grid, [a, b, c], cell) = triangle_grid();

        assert!(grid.remove_cells(&[cell]));
        assert_eq!(grid.cell_count(), 0);
        assert!(!grid.remove_cells(&[cell]));

        // The node set is free for a fresh cell again
        let again = grid.add_cell(&[a, b, c]).unwrap();
        assert_ne!(again, cell);
    }

    #[test]
    fn test_has_nodes_and_nodes_for_cell() {
        let (grid, [a, b, c], cell) = triangle_grid();

        assert!(grid.has_nodes(&[a, b, c]));
        assert!(!grid.has_nodes(&[a, NodeId(9)]));

        let nodes = grid.nodes_for_cell(cell);
        assert_eq!(nodes.len(), 3);
        assert!(grid.nodes_for_cell(CellId(99)).is_empty());
    }

    #[test]
    fn test_nearest_node_queries() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);

        // Fewer than two nodes: no nearest
        assert_eq!(grid.nearest_node_to_node(a), None);
        assert_eq!(grid.nearest_node_to_point(&Point::new(1.0, 1.0)), None);

        let b = grid.add_node(10.0, 0.0);
        let c = grid.add_node(3.0, 4.0);

        assert_eq!(grid.nearest_node_to_node(a), Some(c));
        assert_eq!(grid.nearest_node_to_point(&Point::new(9.0, 1.0)), Some(b));
    }

    #[test]
    fn test_cells_containing_point() {
        let (grid, _, cell) = triangle_grid();

        assert_eq!(
            grid.cells_containing_point(&Point::new(10.0, 10.0)),
            vec![cell]
        );
        assert!(grid
            .cells_containing_point(&Point::new(200.0, 200.0))
            .is_empty());
    }

    #[test]
    fn test_nodes_in_cell() {
        let (mut grid, [a, b, c], cell) = triangle_grid();
        let inside = grid.add_node(10.0, 10.0);
        let outside = grid.add_node(400.0, 400.0);

        let nodes = grid.nodes_in_cell(cell);
        assert!(nodes.contains(&a));
        assert!(nodes.contains(&b));
        assert!(nodes.contains(&c));
        assert!(nodes.contains(&inside));
        assert!(!nodes.contains(&outside));
    }

    #[test]
    fn test_nodes_in_rect() {
        let mut grid = Grid::new();
        let a = grid.add_node(1.0, 1.0);
        let _b = grid.add_node(50.0, 50.0);

        assert_eq!(
            grid.nodes_in_rect(&Rect::new(0.0, 0.0, 10.0, 10.0)),
            vec![a]
        );
    }

    #[test]
    fn test_adjacent_cell_segments() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(100.0, 0.0);
        let c = grid.add_node(0.0, 100.0);
        let d = grid.add_node(100.0, 100.0);

        let c1 = grid.add_cell(&[a, b, c]).unwrap();
        let c2 = grid.add_cell(&[b, c, d]).unwrap();

        let shared = grid.adjacent_cell_segments(c1, c2);
        assert_eq!(shared.len(), 1);
        let key = EdgeKey::new(shared[0].0, shared[0].1);
        assert_eq!(key, EdgeKey::new(b, c));

        assert!(grid.adjacent_cell_segments(c1, CellId(99)).is_empty());
    }

    #[test]
    fn test_snap_point_to_grid() {
        let mut grid = Grid::new();

        // Empty grid: input comes back untouched
        let miss = grid.snap_point_to_grid(&Point::new(5.0, 5.0));
        assert_eq!(miss.point, Point::new(5.0, 5.0));
        assert_eq!(miss.endpoints, None);

        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(100.0, 0.0);
        grid.join_nodes(&[a, b]);

        let hit = grid.snap_point_to_grid(&Point::new(50.0, 20.0));
        assert_eq!(hit.point, Point::new(50.0, 0.0));
        let (e1, e2) = hit.endpoints.unwrap();
        assert_eq!(EdgeKey::new(e1, e2), EdgeKey::new(a, b));
    }

    #[test]
    fn test_config_round_trip() {
        let (mut grid, [a, _b, _c], _) = triangle_grid();
        grid.add_node_with_data(7.0, 8.0, Some(serde_json::json!({"tag": "loose"})));

        let config = grid.to_config();
        let restored = Grid::from_config(&config).unwrap();

        assert_eq!(restored.to_config(), config);
        assert_eq!(restored.node_count(), grid.node_count());
        assert_eq!(restored.cell_count(), grid.cell_count());
        assert_eq!(restored.neighbors(a), grid.neighbors(a));

        // Fresh ids continue past the loaded maximum
        let mut restored = restored;
        let fresh = restored.add_node(0.0, 0.0);
        assert!(grid.get_node(fresh).is_none() || fresh.0 >= 4);
    }

    #[test]
    fn test_reset_rejects_dangling_cell() {
        let mut grid = Grid::new();
        let data = GridData {
            nodes: vec![
                NodeData { id: NodeId(0), x: 0.0, y: 0.0, to: vec![], data: None },
                NodeData { id: NodeId(1), x: 1.0, y: 0.0, to: vec![], data: None },
            ],
            cells: vec![CellData {
                id: CellId(0),
                rels: vec![NodeId(0), NodeId(1), NodeId(9)],
                data: None,
            }],
        };

        assert_eq!(
            grid.reset(&data),
            Err(GridError::MissingCellNode {
                cell: CellId(0),
                node: NodeId(9)
            })
        );
        // Failed load leaves the grid untouched
        assert_eq!(grid.node_count(), 0);
    }

    #[test]
    fn test_reset_rejects_bad_rels_count() {
        let mut grid = Grid::new();
        let data = GridData {
            nodes: vec![
                NodeData { id: NodeId(0), x: 0.0, y: 0.0, to: vec![], data: None },
                NodeData { id: NodeId(1), x: 1.0, y: 0.0, to: vec![], data: None },
            ],
            cells: vec![CellData {
                id: CellId(0),
                rels: vec![NodeId(0), NodeId(1)],
                data: None,
            }],
        };

        assert_eq!(
            grid.reset(&data),
            Err(GridError::CellNodeCount {
                cell: CellId(0),
                count: 2
            })
        );
    }

    #[test]
    fn test_reset_rejects_unknown_neighbor() {
        let mut grid = Grid::new();
        let data = GridData {
            nodes: vec![NodeData {
                id: NodeId(0),
                x: 0.0,
                y: 0.0,
                to: vec![NodeId(5)],
                data: None,
            }],
            cells: vec![],
        };

        assert_eq!(
            grid.reset(&data),
            Err(GridError::UnknownNeighbor {
                node: NodeId(0),
                neighbor: NodeId(5)
            })
        );
    }

    #[test]
    fn test_clear() {
        let (mut grid, _, _) = triangle_grid();
        grid.clear();

        assert_eq!(grid.node_count(), 0);
        assert_eq!(grid.edge_count(), 0);
        assert_eq!(grid.cell_count(), 0);
        assert_eq!(grid.add_node(0.0, 0.0), NodeId(0));
    }
}
