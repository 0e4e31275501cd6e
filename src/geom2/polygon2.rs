use crate::geom2::{Point2, Ring2};
use serde::Serialize;
use std::fmt::Write;
use std::iter::once;

/// A polygon made of one outer ring and zero or more holes strictly inside
/// it. Outer rings carry positive signed area, holes negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon2 {
    outer: Ring2,
    holes: Vec<Ring2>,
}

impl Polygon2 {
    pub fn new(outer: Ring2, holes: Vec<Ring2>) -> Self {
        Self { outer, holes }
    }

    pub fn outer(&self) -> &Ring2 {
        &self.outer
    }

    pub fn holes(&self) -> &[Ring2] {
        &self.holes
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring2> {
        once(&self.outer).chain(self.holes.iter())
    }

    /// True when `p` is inside the outer ring and outside every hole.
    pub fn contains(&self, p: &Point2) -> bool {
        self.outer.contains(p) && !self.holes.iter().any(|h| h.contains(p))
    }

    /// Distance from `p` to the polygon boundary, positive inside the filled
    /// area and negative outside it.
    pub fn signed_distance(&self, p: &Point2) -> f64 {
        let mut d = f64::INFINITY;
        for ring in self.rings() {
            d = d.min(ring.distance_to(p));
        }
        if self.contains(p) {
            d
        } else {
            -d
        }
    }

    /// Serialize all rings as an SVG-style path in move-to/line-to form,
    /// one closed subpath per ring.
    pub fn path_data(&self) -> String {
        let mut d = String::new();
        for ring in self.rings() {
            let points = ring.points();
            if points.len() < 2 {
                continue;
            }
            for (i, p) in points[..points.len() - 1].iter().enumerate() {
                let verb = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{} {} {} ", verb, p.x, p.y);
            }
            d.push_str("Z ");
        }
        d.trim_end().to_string()
    }
}
