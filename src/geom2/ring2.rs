use crate::geom2::{Aabb2, Point2};
use itertools::Itertools;
use serde::Serialize;

/// A closed ring of points. The first and last points coincide, so a ring
/// with `n` distinct vertices stores `n + 1` points.
///
/// In the Y-down raster frame, a positive signed area means the ring runs
/// clockwise on screen. Traced region outlines use positive outer rings and
/// negative holes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring2 {
    points: Vec<Point2>,
}

impl Ring2 {
    /// Build a ring from a vertex sequence, appending the closing point if
    /// the sequence is open.
    pub fn new(mut points: Vec<Point2>) -> Self {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if first != last {
                points.push(first);
            }
        }
        Self { points }
    }

    /// The closed point sequence, first point repeated at the end.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Iterate the ring's segments as point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&Point2, &Point2)> {
        self.points.iter().tuple_windows()
    }

    /// Shoelace signed area. Positive for rings that run clockwise on
    /// screen in the Y-down frame.
    pub fn signed_area(&self) -> f64 {
        let mut sum = 0.0;
        for (a, b) in self.segments() {
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }

    /// Absolute enclosed area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Ray-cast containment test. Points on the boundary are not guaranteed
    /// to land on either side consistently; callers that care should stay
    /// strictly off the boundary.
    pub fn contains(&self, p: &Point2) -> bool {
        let mut inside = false;
        for (a, b) in self.segments() {
            if (a.y > p.y) != (b.y > p.y) {
                let t = (p.y - a.y) / (b.y - a.y);
                if p.x < a.x + t * (b.x - a.x) {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Minimum distance from `p` to the ring boundary.
    pub fn distance_to(&self, p: &Point2) -> f64 {
        let mut best = f64::INFINITY;
        for (a, b) in self.segments() {
            best = best.min(segment_distance(p, a, b));
        }
        best
    }

    /// Axis-aligned bounding box of the vertices.
    pub fn aabb(&self) -> Aabb2 {
        let mut mins = self.points[0];
        let mut maxs = self.points[0];
        for p in &self.points {
            mins.x = mins.x.min(p.x);
            mins.y = mins.y.min(p.y);
            maxs.x = maxs.x.max(p.x);
            maxs.y = maxs.y.max(p.y);
        }
        Aabb2::new(mins, maxs)
    }

    /// Mean of the distinct vertices.
    pub fn vertex_centroid(&self) -> Point2 {
        let n = self.vertex_count().max(1);
        let mut x = 0.0;
        let mut y = 0.0;
        for p in &self.points[..n] {
            x += p.x;
            y += p.y;
        }
        Point2::new(x / n as f64, y / n as f64)
    }
}

fn segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
