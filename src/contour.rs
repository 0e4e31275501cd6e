//! Region outline extraction.
//!
//! For each palette index, the label map is viewed as a binary mask and its
//! 0/1 boundary is traced on the dual grid: pixels are samples at integer
//! coordinates, everything outside the image samples as zero, and the
//! crossing threshold of 0.5 puts every contour vertex at the midpoint of a
//! cell edge, on the half-integer lattice. Rings are then grouped into
//! polygons (outer ring plus the holes it contains) and filtered by area.
//!
//! Cells whose diagonal corners are both set are traced as two separate
//! boundary arcs, so rings correspond one-to-one with the 4-connected
//! components of the mask.
//!
//! Orientation: outer rings run clockwise on screen in the Y-down raster
//! frame (positive shoelace area), holes counter-clockwise (negative).

use crate::geom2::{Point2, Polygon2, Ring2};
use crate::labels::LabelMap;
use image::GrayImage;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;

/// Polygons whose outer ring encloses less than this many square pixels are
/// dropped. Independent of the cleanup threshold: slivers that survive the
/// label map are still too small to outline and number legibly.
const MIN_OUTLINE_AREA: f64 = 50.0;

/// One paintable region: a polygon tagged with the palette index that
/// fills it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// Zero-based palette index.
    pub color_index: usize,
    pub polygon: Polygon2,
}

/// Extract the outlined regions of every palette index in `[0, k)`.
///
/// Indices are traced independently (in parallel) and the results are
/// concatenated in palette order, so output order is deterministic.
pub fn extract_regions(labels: &LabelMap, k: usize) -> Vec<Region> {
    let per_label: Vec<Vec<Region>> = (0..k)
        .into_par_iter()
        .map(|color_index| {
            let mask = labels.mask_of(color_index as u8);
            let rings = trace_mask(&mask);
            group_rings(rings)
                .into_iter()
                .filter(|polygon| polygon.outer().area() >= MIN_OUTLINE_AREA)
                .map(|polygon| Region {
                    color_index,
                    polygon,
                })
                .collect()
        })
        .collect();

    per_label.into_iter().flatten().collect()
}

/// The four edges of a dual-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    fn bit(self) -> u8 {
        match self {
            Edge::Top => 1,
            Edge::Right => 2,
            Edge::Bottom => 4,
            Edge::Left => 8,
        }
    }
}

/// Binary view of a mask with implicit zero padding outside the image.
struct MaskGrid<'a> {
    mask: &'a GrayImage,
    width: i32,
    height: i32,
}

impl<'a> MaskGrid<'a> {
    fn new(mask: &'a GrayImage) -> Self {
        Self {
            mask,
            width: mask.width() as i32,
            height: mask.height() as i32,
        }
    }

    fn sample(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && x < self.width
            && y < self.height
            && self.mask.get_pixel(x as u32, y as u32)[0] > 0
    }

    /// Marching-squares case for the cell whose top-left sample is (cx, cy).
    fn case(&self, cx: i32, cy: i32) -> u8 {
        let tl = self.sample(cx, cy) as u8;
        let tr = self.sample(cx + 1, cy) as u8;
        let br = self.sample(cx + 1, cy + 1) as u8;
        let bl = self.sample(cx, cy + 1) as u8;
        tl << 3 | tr << 2 | br << 1 | bl
    }
}

/// Directed boundary segments per cell case, as (entry edge, exit edge)
/// pairs. Directions keep the set samples on the right of travel, which
/// makes outer rings clockwise on screen. The two-segment saddle cases (5
/// and 10) split the diagonal so that set samples stay 4-connected.
fn segments(case: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match case {
        1 => &[(Left, Bottom)],
        2 => &[(Bottom, Right)],
        3 => &[(Left, Right)],
        4 => &[(Right, Top)],
        5 => &[(Right, Top), (Left, Bottom)],
        6 => &[(Bottom, Top)],
        7 => &[(Left, Top)],
        8 => &[(Top, Left)],
        9 => &[(Top, Bottom)],
        10 => &[(Top, Left), (Bottom, Right)],
        11 => &[(Top, Right)],
        12 => &[(Right, Left)],
        13 => &[(Right, Bottom)],
        14 => &[(Bottom, Left)],
        _ => &[],
    }
}

fn exit_for(case: u8, entry: Edge) -> Option<Edge> {
    segments(case)
        .iter()
        .find(|(from, _)| *from == entry)
        .map(|(_, to)| *to)
}

fn midpoint(cx: i32, cy: i32, edge: Edge) -> Point2 {
    let x = cx as f64;
    let y = cy as f64;
    match edge {
        Edge::Top => Point2::new(x + 0.5, y),
        Edge::Right => Point2::new(x + 1.0, y + 0.5),
        Edge::Bottom => Point2::new(x + 0.5, y + 1.0),
        Edge::Left => Point2::new(x, y + 0.5),
    }
}

/// Trace every closed boundary ring of a binary mask.
pub fn trace_mask(mask: &GrayImage) -> Vec<Ring2> {
    let grid = MaskGrid::new(mask);

    // Cells run from (-1, -1) through (width - 1, height - 1) so the
    // implicit padding ring is included; +1 shifts them to array indices.
    let cells_w = (grid.width + 1) as usize;
    let cells_h = (grid.height + 1) as usize;
    let mut visited = vec![0u8; cells_w * cells_h];
    let cell_index = |cx: i32, cy: i32| (cy + 1) as usize * cells_w + (cx + 1) as usize;

    let mut rings = Vec::new();
    for cy in -1..grid.height {
        for cx in -1..grid.width {
            let case = grid.case(cx, cy);
            for &(entry, _) in segments(case) {
                if visited[cell_index(cx, cy)] & entry.bit() != 0 {
                    continue;
                }
                if let Some(ring) = trace_ring(&grid, &mut visited, &cell_index, cx, cy, entry) {
                    rings.push(ring);
                } else {
                    warn!("inconsistent contour cell at ({}, {}); ring dropped", cx, cy);
                }
            }
        }
    }
    rings
}

fn trace_ring(
    grid: &MaskGrid<'_>,
    visited: &mut [u8],
    cell_index: &dyn Fn(i32, i32) -> usize,
    start_cx: i32,
    start_cy: i32,
    start_edge: Edge,
) -> Option<Ring2> {
    let mut points = Vec::new();
    let (mut cx, mut cy, mut entry) = (start_cx, start_cy, start_edge);

    loop {
        visited[cell_index(cx, cy)] |= entry.bit();
        points.push(midpoint(cx, cy, entry));

        let exit = exit_for(grid.case(cx, cy), entry)?;
        match exit {
            Edge::Top => {
                cy -= 1;
                entry = Edge::Bottom;
            }
            Edge::Right => {
                cx += 1;
                entry = Edge::Left;
            }
            Edge::Bottom => {
                cy += 1;
                entry = Edge::Top;
            }
            Edge::Left => {
                cx -= 1;
                entry = Edge::Right;
            }
        }
        if cx == start_cx && cy == start_cy && entry == start_edge {
            break;
        }
    }

    Some(Ring2::new(points))
}

/// Group a flat set of rings into polygons by containment: rings at even
/// nesting depth become outer rings, odd-depth rings become holes of the
/// innermost ring that encloses them.
pub fn group_rings(rings: Vec<Ring2>) -> Vec<Polygon2> {
    let n = rings.len();
    if n == 0 {
        return Vec::new();
    }

    let areas: Vec<f64> = rings.iter().map(Ring2::area).collect();
    let mut depth = vec![0usize; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];

    // Rings from one mask never share vertices, so any single vertex is a
    // valid containment probe.
    for i in 0..n {
        let probe = rings[i].points()[0];
        for j in 0..n {
            if i == j || !rings[j].contains(&probe) {
                continue;
            }
            depth[i] += 1;
            if parent[i].map_or(true, |p| areas[j] < areas[p]) {
                parent[i] = Some(j);
            }
        }
    }

    let mut hole_lists: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        if depth[i] % 2 == 1 {
            if let Some(p) = parent[i] {
                hole_lists[p].push(i);
            }
        }
    }

    let mut slots: Vec<Option<Ring2>> = rings.into_iter().map(Some).collect();
    let mut polygons = Vec::new();
    for i in 0..n {
        if depth[i] % 2 != 0 {
            continue;
        }
        let holes: Vec<Ring2> = hole_lists[i]
            .iter()
            .filter_map(|&h| slots[h].take())
            .collect();
        if let Some(outer) = slots[i].take() {
            polygons.push(Polygon2::new(outer, holes));
        }
    }
    polygons
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    fn mask_from(width: u32, height: u32, set: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in set {
            mask.put_pixel(x, y, Luma([255]));
        }
        mask
    }

    fn block(x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<(u32, u32)> {
        let mut px = Vec::new();
        for y in y0..y1 {
            for x in x0..x1 {
                px.push((x, y));
            }
        }
        px
    }

    #[test]
    fn empty_mask_has_no_rings() {
        let mask = GrayImage::new(6, 6);
        assert!(trace_mask(&mask).is_empty());
    }

    #[test]
    fn single_pixel_traces_a_diamond() {
        let mask = mask_from(4, 4, &[(1, 1)]);
        let rings = trace_mask(&mask);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].vertex_count(), 4);
        assert_relative_eq!(rings[0].signed_area(), 0.5);
        assert!(rings[0].contains(&Point2::new(1.0, 1.0)));
    }

    #[test]
    fn square_block_area_loses_the_corner_cuts() {
        // An n-by-n block encloses n^2 - 0.5: four corner cuts of 1/8 each.
        let mask = mask_from(5, 5, &block(1, 1, 4, 4));
        let rings = trace_mask(&mask);
        assert_eq!(rings.len(), 1);
        assert_relative_eq!(rings[0].signed_area(), 8.5);
    }

    #[test]
    fn full_frame_ring_hugs_the_border() {
        let mask = mask_from(4, 3, &block(0, 0, 4, 3));
        let rings = trace_mask(&mask);
        assert_eq!(rings.len(), 1);
        assert_relative_eq!(rings[0].signed_area(), 11.5);
        let aabb = rings[0].aabb();
        assert_relative_eq!(aabb.mins.x, -0.5);
        assert_relative_eq!(aabb.maxs.y, 2.5);
    }

    #[test]
    fn diagonal_pixels_stay_separate() {
        let mask = mask_from(4, 4, &[(1, 1), (2, 2)]);
        let rings = trace_mask(&mask);
        assert_eq!(rings.len(), 2);
        for ring in &rings {
            assert_relative_eq!(ring.signed_area(), 0.5);
        }
    }

    #[test]
    fn cavity_produces_a_negative_ring() {
        let mut set = block(0, 0, 5, 5);
        set.retain(|&(x, y)| !(x == 2 && y == 2));
        let mask = mask_from(5, 5, &set);
        let mut rings = trace_mask(&mask);
        assert_eq!(rings.len(), 2);
        rings.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap());
        assert_relative_eq!(rings[0].signed_area(), 24.5);
        assert_relative_eq!(rings[1].signed_area(), -0.5);
    }

    #[test]
    fn grouping_attaches_holes_to_their_outer() {
        let mut set = block(0, 0, 6, 6);
        set.retain(|&(x, y)| !(x == 2 && (y == 2 || y == 3)));
        let mask = mask_from(6, 6, &set);
        let polygons = group_rings(trace_mask(&mask));
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes().len(), 1);
        assert!(polygons[0].contains(&Point2::new(4.0, 4.0)));
        assert!(!polygons[0].contains(&Point2::new(2.0, 2.5)));
    }

    #[test]
    fn grouping_keeps_islands_inside_holes_as_outers() {
        // A 7x7 frame, a 5x5 cavity, and a single island pixel in the
        // middle: two polygons, one with a hole.
        let mut set = block(0, 0, 7, 7);
        set.retain(|&(x, y)| !(1..=5).contains(&x) || !(1..=5).contains(&y));
        set.push((3, 3));
        let mask = mask_from(7, 7, &set);
        let polygons = group_rings(trace_mask(&mask));
        assert_eq!(polygons.len(), 2);
        let with_hole = polygons.iter().find(|p| !p.holes().is_empty()).unwrap();
        assert_eq!(with_hole.holes().len(), 1);
        let island = polygons.iter().find(|p| p.holes().is_empty()).unwrap();
        assert_relative_eq!(island.outer().signed_area(), 0.5);
    }

    #[test]
    fn extraction_filters_small_regions_but_keeps_the_map() {
        let mut labels = vec![0u8; 20 * 20];
        // A 3x3 patch of label 1: area 8.5, under the outline threshold.
        for y in 5..8 {
            for x in 5..8 {
                labels[y * 20 + x] = 1;
            }
        }
        let map = LabelMap::from_raw(20, 20, labels).unwrap();
        let regions = extract_regions(&map, 2);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].color_index, 0);
        assert_eq!(regions[0].polygon.holes().len(), 1);
    }
}
