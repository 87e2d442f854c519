//! Routing between arbitrary points via temporary anchor nodes.
//!
//! `route` answers "connect these two points" for points that need not be
//! mesh nodes: each endpoint gets a temporary anchor stitched into the mesh
//! (directly inside its containing cells, or snapped onto the nearest edge),
//! the anchors are path-searched, and the anchors are removed again before
//! returning. A route call must therefore not run concurrently with other
//! work on the same grid; the anchors are visible mesh state while it runs.

use super::cell::{CellId, EdgeKey};
use super::engine::Grid;
use super::node::NodeId;
use crate::geometry::Point;

/// A temporary node stitching an off-mesh point into the grid.
#[derive(Debug, Clone)]
struct Anchor {
    id: NodeId,
    /// Where the anchor actually sits: the original point, or its projection
    /// onto the nearest edge.
    position: Point,
    /// The edge the anchor snapped onto, when it was not inside any cell.
    snapped_edge: Option<EdgeKey>,
    /// Cells the anchor was wired into.
    cells: Vec<CellId>,
}

impl Grid {
    /// Route between two points, keeping the result on the mesh.
    pub fn route(&mut self, a: &Point, b: &Point) -> Vec<Point> {
        self.route_with(a, b, true)
    }

    /// Route between two points.
    ///
    /// Returns an ordered list of waypoints, or an empty list when the two
    /// points cannot be connected through the mesh. With `confine_to_grid`
    /// the route ends at `b`'s projection onto the mesh; without it the
    /// original `b` is appended when it lies off-mesh. No temporary state
    /// survives the call, whether a route is found or not.
    pub fn route_with(&mut self, a: &Point, b: &Point, confine_to_grid: bool) -> Vec<Point> {
        let cells_a = self.cells_containing_point(a);
        let cells_b = self.cells_containing_point(b);

        // Endpoints sharing a cell are treated as mutually visible. This
        // does not check polygon-union crossings between merely adjacent
        // cells; callers get the straight segment as-is.
        if cells_a.iter().any(|c| cells_b.contains(c)) {
            return vec![*a, *b];
        }

        let anchor_a = self.drop_anchor(a, cells_a);
        let anchor_b = self.drop_anchor(b, cells_b);

        let same_edge = anchor_a.snapped_edge.is_some()
            && anchor_a.snapped_edge == anchor_b.snapped_edge;
        let shared_cell = anchor_a
            .cells
            .iter()
            .any(|c| anchor_b.cells.contains(c));
        if same_edge || shared_cell {
            self.join_nodes(&[anchor_a.id, anchor_b.id]);
        }

        let found = self.find_path(anchor_a.id, anchor_b.id);

        let mut result = Vec::new();
        if let Some(path) = found {
            if a.distance_to(&anchor_a.position) > 0.0 {
                result.push(*a);
            }
            result.extend(
                path.nodes
                    .iter()
                    .filter_map(|&id| self.get_node(id))
                    .map(|n| n.position()),
            );
            if !confine_to_grid && b.distance_to(&anchor_b.position) > 0.0 {
                result.push(*b);
            }
        }

        // Anchors never leak, found route or not
        self.remove_nodes(&[anchor_a.id, anchor_b.id]);
        result
    }

    /// Insert a temporary anchor node for a point and wire it into the mesh.
    ///
    /// Inside one or more cells, the anchor sits at the point itself. Off
    /// the mesh, the anchor moves to the point's projection onto the nearest
    /// edge, is joined to that edge's endpoints, and adopts the cells sharing
    /// that edge. Either way the anchor is joined to every vertex of each of
    /// its cells.
    fn drop_anchor(&mut self, p: &Point, mut cells: Vec<CellId>) -> Anchor {
        let id = self.add_node(p.x, p.y);
        let mut position = *p;
        let mut snapped_edge = None;

        if cells.is_empty() {
            let snapped = self.snap_point_to_grid(p);
            if let Some((e1, e2)) = snapped.endpoints {
                position = snapped.point;
                self.set_node_position(id, position.x, position.y);
                self.join_nodes(&[id, e1]);
                self.join_nodes(&[id, e2]);

                let key = EdgeKey::new(e1, e2);
                snapped_edge = Some(key);
                cells = self.cells_with_edge(key);
            }
        }

        for cell_id in &cells {
            let rels = match self.get_cell(*cell_id) {
                Some(cell) => cell.rels,
                None => continue,
            };
            for vertex in rels {
                self.join_nodes(&[id, vertex]);
            }
        }

        Anchor {
            id,
            position,
            snapped_edge,
            cells,
        }
    }
}
