//! Intersection over Union (IoU) calculation for polygons.
//!
//! Polygon overlap uses the boolean operations from the `geo` crate.
//! Degenerate point lists (fewer than 3 vertices) score zero overlap
//! rather than failing; self-intersecting rings are resolved into valid
//! geometry before the area computation.

use crate::types::{Corners, Point};
use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};

/// Convert box corners to the equivalent 4-point polygon.
///
/// Vertices come back in upper-left, upper-right, lower-right, lower-left
/// order so box labels can be scored against polygon predictions with the
/// same overlap machinery.
pub fn rect_to_points(corners: &Corners) -> Vec<Point> {
    let [x1, y1, x2, y2] = *corners;
    vec![[x1, y1], [x2, y1], [x2, y2], [x1, y2]]
}

/// Build a valid multi-polygon from a vertex list.
///
/// Returns `None` for degenerate input (fewer than 3 vertices). A
/// self-intersecting ring is repaired by resolving it with the boolean-op
/// fill rule, the nearest valid geometry for such input.
fn build_polygon(points: &[Point]) -> Option<MultiPolygon<f64>> {
    if points.len() < 3 {
        return None;
    }
    let ring: Vec<(f64, f64)> = points.iter().map(|p| (p[0], p[1])).collect();
    let poly = Polygon::new(LineString::from(ring), vec![]);
    Some(poly.union(&poly))
}

/// Calculate the IoU between two polygons given as vertex lists.
///
/// Returns a value in [0.0, 1.0]. Either side being degenerate, or a
/// zero-area union, yields 0.0.
///
/// # Example
///
/// ```
/// use det_eval::metrics::polygon::polygon_iou;
///
/// let square = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
/// assert!((polygon_iou(&square, &square) - 1.0).abs() < 1e-9);
/// ```
pub fn polygon_iou(a: &[Point], b: &[Point]) -> f64 {
    let (poly_a, poly_b) = match (build_polygon(a), build_polygon(b)) {
        (Some(pa), Some(pb)) => (pa, pb),
        _ => return 0.0,
    };

    let union = poly_a.union(&poly_b).unsigned_area();
    if union == 0.0 {
        return 0.0;
    }
    let intersection = poly_a.intersection(&poly_b).unsigned_area();

    (intersection / union).clamp(0.0, 1.0)
}

/// Calculate the pairwise IoU matrix between two sets of polygons.
///
/// `result[i][j]` is the IoU between `a[i]` and `b[j]`. Quadratic in the
/// number of polygons; this is the dominant cost for polygon-heavy input.
pub fn polygon_iou_matrix(a: &[Vec<Point>], b: &[Vec<Point>]) -> Vec<Vec<f64>> {
    a.iter()
        .map(|poly_a| b.iter().map(|poly_b| polygon_iou(poly_a, poly_b)).collect())
        .collect()
}
