//! The mesh engine: nodes, cells, mutation and query operations.
//!
//! This module provides the owning `Grid` structure built on petgraph's
//! StableUnGraph for stable ids across removals, the triangle-cell
//! bookkeeping layered on top of it, the path search, and the anchor-based
//! routing between arbitrary points.

mod cell;
mod config;
mod engine;
mod node;
mod route;
mod search;

pub use cell::{CellId, EdgeKey, GridCell};
pub use config::{CellData, GridData, GridError, NodeData};
pub use engine::{Grid, SnappedPoint};
pub use node::{GridNode, NodeId};
pub use search::SearchPath;
