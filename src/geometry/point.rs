//! Point and rectangle value types.
//!
//! Both are plain values: a `Point` has no identity (identified points are
//! `GridNode`s), and a `Rect` is always derived at query time, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D coordinate in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f32, f32)> for Point {
    #[inline]
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rect from its top-left corner and extent.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Check whether a point lies within the rect (boundary inclusive).
    #[inline]
    pub fn hit_test(&self, p: &Point) -> bool {
        p.x >= self.x
            && p.x <= self.x + self.width
            && p.y >= self.y
            && p.y <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_rect_hit_test() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);

        assert!(r.hit_test(&Point::new(15.0, 12.0)));
        assert!(!r.hit_test(&Point::new(9.0, 12.0)));
        assert!(!r.hit_test(&Point::new(15.0, 16.0)));

        // Boundary is inclusive on all four sides
        assert!(r.hit_test(&Point::new(10.0, 10.0)));
        assert!(r.hit_test(&Point::new(30.0, 15.0)));
    }
}
