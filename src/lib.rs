//! Walkmesh - WASM Module
//!
//! This module provides the planar spatial-graph engine behind a
//! triangle-mesh editor: a mutable mesh of labeled points connected by
//! undirected edges and grouped into triangular cells, with shortest-path
//! search, containment and snapping queries, and anchor-based routing
//! between arbitrary points. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; rendering, input handling and
//! persistence live on the JS side and only consume this API.
//!
//! # Architecture
//!
//! - `geometry`: points, rects, and the pure planar predicates
//! - `grid`: the owning mesh engine, path search, and routing

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod geometry;
pub mod grid;

use geometry::{Point, Rect};
use grid::{CellId, Grid, GridData, NodeId};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"walkmesh-wasm initialized".into());
}

/// Main entry point for the mesh engine.
///
/// This struct wraps the internal Grid and provides the public API exposed
/// to JavaScript. Point lists cross the boundary as flat Float32Arrays
/// [x0, y0, x1, y1, ...], id lists as Uint32Arrays.
#[wasm_bindgen]
pub struct WalkmeshWasm {
    grid: Grid,
}

#[wasm_bindgen]
impl WalkmeshWasm {
    /// Create a new empty mesh.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { grid: Grid::new() }
    }

    /// Create a mesh from a serialized `GridData` snapshot.
    ///
    /// Fails on data-integrity violations (dangling references, malformed
    /// cells) instead of repairing them.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<WalkmeshWasm, JsError> {
        let data: GridData = serde_wasm_bindgen::from_value(config)?;
        let grid = Grid::from_config(&data)?;
        Ok(Self { grid })
    }

    /// Replace the mesh contents with a serialized snapshot.
    #[wasm_bindgen(js_name = loadConfig)]
    pub fn load_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let data: GridData = serde_wasm_bindgen::from_value(config)?;
        self.grid.reset(&data)?;
        Ok(())
    }

    /// Produce the serialized snapshot of the whole mesh.
    #[wasm_bindgen(js_name = toConfig)]
    pub fn to_config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.grid.to_config())?)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position. Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32) -> u32 {
        self.grid.add_node(x, y).0
    }

    /// Add a node with a caller-chosen id, or undefined when the id is taken.
    #[wasm_bindgen(js_name = addNodeWithId)]
    pub fn add_node_with_id(&mut self, id: u32, x: f32, y: f32) -> Option<u32> {
        self.grid.add_node_with_id(NodeId(id), x, y).map(|n| n.0)
    }

    /// Connect every pair among the given node ids.
    ///
    /// Returns false (and changes nothing) unless at least two ids are given
    /// and all of them exist.
    #[wasm_bindgen(js_name = joinNodes)]
    pub fn join_nodes(&mut self, ids: &[u32]) -> bool {
        self.grid.join_nodes(&to_node_ids(ids))
    }

    /// Disconnect every connected pair among the given node ids, deleting
    /// any cell that rode a removed edge. Returns whether an edge was removed.
    #[wasm_bindgen(js_name = splitNodes)]
    pub fn split_nodes(&mut self, ids: &[u32]) -> bool {
        self.grid.split_nodes(&to_node_ids(ids))
    }

    /// Remove all edges of each given node. Cells are left alone.
    #[wasm_bindgen(js_name = detachNodes)]
    pub fn detach_nodes(&mut self, ids: &[u32]) -> bool {
        self.grid.detach_nodes(&to_node_ids(ids))
    }

    /// Remove the given nodes along with their edges and any cell that
    /// references them.
    #[wasm_bindgen(js_name = removeNodes)]
    pub fn remove_nodes(&mut self, ids: &[u32]) -> bool {
        self.grid.remove_nodes(&to_node_ids(ids))
    }

    /// Move a node to a new position.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32) {
        self.grid.set_node_position(NodeId(node_id), x, y);
    }

    /// Get a node's X position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f32> {
        self.grid.get_node(NodeId(node_id)).map(|n| n.x)
    }

    /// Get a node's Y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f32> {
        self.grid.get_node(NodeId(node_id)).map(|n| n.y)
    }

    /// True iff every given node id exists.
    #[wasm_bindgen(js_name = hasNodes)]
    pub fn has_nodes(&self, ids: &[u32]) -> bool {
        self.grid.has_nodes(&to_node_ids(ids))
    }

    /// Get neighbors of a node, ascending.
    #[wasm_bindgen(js_name = getNeighbors)]
    pub fn get_neighbors(&self, node_id: u32) -> Vec<u32> {
        to_raw_ids(&self.grid.neighbors(NodeId(node_id)))
    }

    /// Get the number of nodes.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.grid.node_count() as u32
    }

    /// Get the number of undirected edges.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.grid.edge_count() as u32
    }

    // =========================================================================
    // Cell Operations
    // =========================================================================

    /// Register the triangle spanned by three distinct existing nodes.
    ///
    /// Returns the cell id (the existing one when the same node set is
    /// already registered), or None when the preconditions fail.
    #[wasm_bindgen(js_name = addCell)]
    pub fn add_cell(&mut self, rels: &[u32]) -> Option<u32> {
        self.grid.add_cell(&to_node_ids(rels)).map(|id| id.0)
    }

    /// Delete each existing cell id. Returns whether anything changed.
    #[wasm_bindgen(js_name = removeCells)]
    pub fn remove_cells(&mut self, ids: &[u32]) -> bool {
        let ids: Vec<CellId> = ids.iter().map(|&id| CellId(id)).collect();
        self.grid.remove_cells(&ids)
    }

    /// The cell's three node ids in stored winding order, empty if absent.
    #[wasm_bindgen(js_name = nodesForCell)]
    pub fn nodes_for_cell(&self, cell_id: u32) -> Vec<u32> {
        self.grid
            .nodes_for_cell(CellId(cell_id))
            .iter()
            .map(|n| n.id.0)
            .collect()
    }

    /// Get the number of cells.
    #[wasm_bindgen(js_name = cellCount)]
    pub fn cell_count(&self) -> u32 {
        self.grid.cell_count() as u32
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest other node to a node, or None with fewer than two
    /// nodes in the mesh.
    #[wasm_bindgen(js_name = nearestNodeToNode)]
    pub fn nearest_node_to_node(&self, node_id: u32) -> Option<u32> {
        self.grid.nearest_node_to_node(NodeId(node_id)).map(|id| id.0)
    }

    /// Find the nearest node to a point, or None with fewer than two nodes
    /// in the mesh.
    #[wasm_bindgen(js_name = nearestNodeToPoint)]
    pub fn nearest_node_to_point(&self, x: f32, y: f32) -> Option<u32> {
        self.grid
            .nearest_node_to_point(&Point::new(x, y))
            .map(|id| id.0)
    }

    /// All cells whose region contains the point.
    #[wasm_bindgen(js_name = cellsContainingPoint)]
    pub fn cells_containing_point(&self, x: f32, y: f32) -> Vec<u32> {
        self.grid
            .cells_containing_point(&Point::new(x, y))
            .iter()
            .map(|id| id.0)
            .collect()
    }

    /// A cell's vertices plus every node falling inside its region.
    #[wasm_bindgen(js_name = nodesInCell)]
    pub fn nodes_in_cell(&self, cell_id: u32) -> Vec<u32> {
        to_raw_ids(&self.grid.nodes_in_cell(CellId(cell_id)))
    }

    /// All nodes within a rectangle.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<u32> {
        to_raw_ids(&self.grid.nodes_in_rect(&Rect::new(x, y, width, height)))
    }

    /// Boundary segments shared by two cells, as flat id pairs
    /// [a0, b0, a1, b1, ...].
    #[wasm_bindgen(js_name = adjacentCellSegments)]
    pub fn adjacent_cell_segments(&self, c1: u32, c2: u32) -> Vec<u32> {
        self.grid
            .adjacent_cell_segments(CellId(c1), CellId(c2))
            .iter()
            .flat_map(|&(a, b)| [a.0, b.0])
            .collect()
    }

    /// Project a point onto the closest mesh edge.
    ///
    /// Returns `{ point: {x, y}, endpoints: [a, b] | null }`; with no edges
    /// in the mesh the input point comes back with null endpoints.
    #[wasm_bindgen(js_name = snapPointToGrid)]
    pub fn snap_point_to_grid(&self, x: f32, y: f32) -> Result<JsValue, JsError> {
        let snapped = self.grid.snap_point_to_grid(&Point::new(x, y));
        Ok(serde_wasm_bindgen::to_value(&snapped)?)
    }

    // =========================================================================
    // Search and Routing
    // =========================================================================

    /// Find the cheapest path between two nodes under Euclidean cost.
    ///
    /// Returns the node ids along the path, or None when unreachable.
    #[wasm_bindgen(js_name = findPath)]
    pub fn find_path(&self, start: u32, goal: u32) -> Option<Vec<u32>> {
        self.grid
            .find_path(NodeId(start), NodeId(goal))
            .map(|path| to_raw_ids(&path.nodes))
    }

    /// Route between two arbitrary points, confined to the mesh.
    ///
    /// Returns waypoints as a flat Float32Array [x0, y0, x1, y1, ...];
    /// empty means no route exists.
    pub fn route(&mut self, ax: f32, ay: f32, bx: f32, by: f32) -> Float32Array {
        self.route_with(ax, ay, bx, by, true)
    }

    /// Route between two arbitrary points, optionally letting the route
    /// leave the mesh to reach the destination.
    #[wasm_bindgen(js_name = routeWith)]
    pub fn route_with(
        &mut self,
        ax: f32,
        ay: f32,
        bx: f32,
        by: f32,
        confine_to_grid: bool,
    ) -> Float32Array {
        let waypoints =
            self.grid
                .route_with(&Point::new(ax, ay), &Point::new(bx, by), confine_to_grid);
        let flat: Vec<f32> = waypoints.iter().flat_map(|p| [p.x, p.y]).collect();
        Float32Array::from(&flat[..])
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Clear all nodes, edges and cells.
    pub fn clear(&mut self) {
        self.grid.clear();
    }
}

impl Default for WalkmeshWasm {
    fn default() -> Self {
        Self::new()
    }
}

fn to_node_ids(ids: &[u32]) -> Vec<NodeId> {
    ids.iter().map(|&id| NodeId(id)).collect()
}

fn to_raw_ids(ids: &[NodeId]) -> Vec<u32> {
    ids.iter().map(|id| id.0).collect()
}
