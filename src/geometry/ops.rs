//! Pure geometry predicates and searches.
//!
//! Coordinates are in screen space where y grows downward, so the sign
//! conventions here are mirrored relative to textbook math orientation.
//! `ccw` and the winding test below agree on that convention; cell winding
//! and adjacent-segment detection depend on it staying consistent.

use super::point::{Point, Rect};

/// Signed magnitude of the cross product (y − x) × (z − x).
///
/// The sign encodes the turn direction at `y` when traversing x → y → z.
#[inline]
pub fn cross(x: &Point, y: &Point, z: &Point) -> f32 {
    (y.x - x.x) * (z.y - x.y) - (y.y - x.y) * (z.x - x.x)
}

/// Counter-clockwise turn test in screen coordinates.
#[inline]
pub fn ccw(x: &Point, y: &Point, z: &Point) -> bool {
    cross(x, y, z) < 0.0
}

/// Whether segment AB intersects segment CD.
///
/// Collinear and shared-endpoint cases are not specially handled.
pub fn intersect(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Winding-number point-in-polygon test against a closed ring.
///
/// Sums signed edge crossings of the horizontal through `p`; nonzero winding
/// means the point is enclosed. The half-open y comparisons pin boundary
/// behavior, which plain ray casting would not.
pub fn hit_test_point_ring(p: &Point, ring: &[Point]) -> bool {
    let mut winding = 0i32;
    for i in 0..ring.len() {
        let a = &ring[i];
        let b = &ring[(i + 1) % ring.len()];
        if a.y <= p.y {
            if b.y > p.y && cross(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && cross(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Minimal axis-aligned rect covering all points, or None for an empty set.
pub fn bounding_rect_for_points(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    for p in &points[1..] {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Closest point to `p` on the segment from `a` to `b`.
///
/// Clamps the parametric projection t = dot(p−a, b−a) / |b−a|² to [0, 1],
/// so the result never leaves the segment. A zero-length segment yields `a`.
pub fn snap_point_to_line_segment(p: &Point, a: &Point, b: &Point) -> Point {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return *a;
    }

    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * abx, a.y + t * aby)
}

/// Index of the candidate closest to `target` by Euclidean distance.
///
/// Candidates are visited in ascending x-distance order so the scan can stop
/// as soon as a candidate's x-distance alone exceeds the best full distance
/// found (Euclidean distance is never less than |Δx|).
pub fn nearest_point_to_point(target: &Point, points: &[Point]) -> Option<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let da = (target.x - points[a].x).abs();
        let db = (target.x - points[b].x).abs();
        db.total_cmp(&da)
    });

    let mut best: Option<(usize, f32)> = None;
    while let Some(i) = order.pop() {
        let dx = (target.x - points[i].x).abs();
        if let Some((_, best_dist)) = best {
            if dx > best_dist {
                break;
            }
        }
        let dist = target.distance_to(&points[i]);
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((i, dist));
        }
    }

    best.map(|(i, _)| i)
}
