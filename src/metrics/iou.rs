//! Intersection over Union (IoU) calculation for axis-aligned boxes.

use crate::types::Corners;

/// Calculate the Intersection over Union (IoU) between two boxes.
///
/// Boxes are given as corner coordinates `[x1, y1, x2, y2]`. IoU is the
/// area of intersection divided by the area of union; the intersection
/// width and height are clamped at zero so disjoint boxes score 0.0.
///
/// # Example
///
/// ```
/// use det_eval::metrics::iou::calculate_iou;
///
/// let iou = calculate_iou(&[0.0, 0.0, 10.0, 10.0], &[5.0, 5.0, 15.0, 15.0]);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(a: &Corners, b: &Corners) -> f64 {
    let x_left = a[0].max(b[0]);
    let y_top = a[1].max(b[1]);
    let x_right = a[2].min(b[2]);
    let y_bottom = a[3].min(b[3]);

    let width = (x_right - x_left).max(0.0);
    let height = (y_bottom - y_top).max(0.0);
    let intersection = width * height;

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    let union = area_a + area_b - intersection;

    // Both boxes degenerate and disjoint
    if union == 0.0 {
        return 0.0;
    }

    intersection / union
}

/// Calculate the pairwise IoU matrix between two sets of boxes.
///
/// `result[i][j]` is the IoU between `a[i]` and `b[j]`; swapping the
/// arguments transposes the matrix.
pub fn calculate_iou_matrix(a: &[Corners], b: &[Corners]) -> Vec<Vec<f64>> {
    a.iter()
        .map(|box_a| b.iter().map(|box_b| calculate_iou(box_a, box_b)).collect())
        .collect()
}
