//! Pole of inaccessibility: the interior point of a polygon farthest from
//! its boundary, found by a best-first quadtree search over the bounding
//! box of the outer ring.

use crate::geom2::{Point2, Polygon2};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

#[derive(Debug, Clone)]
struct Cell {
    center: Point2,
    half: f64,
    dist: f64,
    /// Upper bound on the signed distance anywhere in the cell.
    bound: f64,
}

impl Cell {
    fn new(center: Point2, half: f64, poly: &Polygon2) -> Self {
        let dist = poly.signed_distance(&center);
        Cell {
            center,
            half,
            dist,
            bound: dist + half * SQRT_2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.bound == other.bound
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound.partial_cmp(&other.bound).unwrap_or(Ordering::Equal)
    }
}

/// Find the interior point of `poly` that maximizes distance to the
/// boundary, to within `precision` pixels.
///
/// The search seeds a max-heap with the four quadrant cells of the outer
/// ring's bounding box plus the vertex centroid as a zero-size candidate,
/// then repeatedly refines the most promising cell until no cell can beat
/// the best distance found by more than `precision`.
///
/// Returns the point and its boundary distance, or `None` when no candidate
/// lands strictly inside the polygon (degenerate or hole-covered shapes).
pub fn pole_of_inaccessibility(poly: &Polygon2, precision: f64) -> Option<(Point2, f64)> {
    let aabb = poly.outer().aabb();
    let extent = aabb.maxs - aabb.mins;
    let quarter = extent.x.min(extent.y) / 4.0;

    let mut best = Cell::new(poly.outer().vertex_centroid(), 0.0, poly);

    let mut queue = BinaryHeap::new();
    for (fx, fy) in [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)] {
        let center = Point2::new(aabb.mins.x + extent.x * fx, aabb.mins.y + extent.y * fy);
        queue.push(Cell::new(center, quarter, poly));
    }

    while let Some(cell) = queue.pop() {
        if cell.bound <= best.dist + precision {
            break;
        }
        if cell.dist > best.dist {
            best = cell.clone();
        }
        if cell.half > precision / 2.0 {
            let h = cell.half / 2.0;
            for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
                let center = Point2::new(cell.center.x + sx * h, cell.center.y + sy * h);
                queue.push(Cell::new(center, h, poly));
            }
        }
    }

    if best.dist > 0.0 {
        Some((best.center, best.dist))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::Ring2;
    use approx::assert_relative_eq;

    fn square(min: f64, max: f64, clockwise: bool) -> Ring2 {
        let mut pts = vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ];
        if !clockwise {
            pts.reverse();
        }
        Ring2::new(pts)
    }

    #[test]
    fn square_pole_is_the_center() {
        let poly = Polygon2::new(square(0.0, 10.0, true), Vec::new());
        let (p, d) = pole_of_inaccessibility(&poly, 0.1).unwrap();
        assert_relative_eq!(p.x, 5.0, epsilon = 0.2);
        assert_relative_eq!(p.y, 5.0, epsilon = 0.2);
        assert_relative_eq!(d, 5.0, epsilon = 0.2);
    }

    #[test]
    fn tall_rectangle_pole_sits_on_the_long_axis() {
        let poly = Polygon2::new(
            Ring2::new(vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 40.0),
                Point2::new(0.0, 40.0),
            ]),
            Vec::new(),
        );
        let (p, d) = pole_of_inaccessibility(&poly, 0.5).unwrap();
        assert_relative_eq!(p.x, 5.0, epsilon = 1.0);
        assert_relative_eq!(d, 5.0, epsilon = 0.5);
    }

    #[test]
    fn annulus_pole_avoids_the_hole() {
        let poly = Polygon2::new(square(0.0, 20.0, true), vec![square(6.0, 14.0, false)]);
        let (p, d) = pole_of_inaccessibility(&poly, 0.25).unwrap();
        assert!(poly.contains(&p));
        // The widest spot in the band is a corner of the frame.
        assert!(d > 2.5, "distance {} should beat the band midline", d);
    }

    #[test]
    fn fully_holed_polygon_has_no_pole() {
        // A hole one step inside the outer ring leaves no room at the
        // 1-pixel precision used by the pipeline.
        let poly = Polygon2::new(square(0.0, 2.0, true), vec![square(0.0, 2.0, false)]);
        assert!(pole_of_inaccessibility(&poly, 1.0).is_none());
    }
}
