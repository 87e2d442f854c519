//! Planar geometry primitives and predicates.
//!
//! This module provides the value types (points, rects) and the pure
//! predicates (winding, intersection, projection, nearest-point search)
//! that the grid engine and the router are built on.

mod ops;
mod point;

pub use ops::{
    bounding_rect_for_points, ccw, cross, hit_test_point_ring, intersect,
    nearest_point_to_point, snap_point_to_line_segment,
};
pub use point::{Point, Rect};
