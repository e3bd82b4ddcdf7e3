//! Matching and counting engine.
//!
//! Classifies predictions and labels into true/false positives and
//! false negatives per image, per class and per threshold pair, at both
//! instance and image granularity.
//!
//! Matching is evaluated independently per prediction (row max over the
//! overlap matrix) and independently per label (column max); it is not a
//! one-to-one bipartite assignment, so one ground truth can count as
//! matched by several predictions and vice versa.

use crate::metrics::iou::calculate_iou_matrix;
use crate::metrics::polygon::{polygon_iou_matrix, rect_to_points};
use crate::types::{ClassMap, Corners, Counts, Point, Shape, ShapeSet};
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Count TP/FP/FN/GT across all images of a dataset.
///
/// Per-image partial counts are computed on independent rayon workers and
/// merged by elementwise summation. `total_images` in the result is the
/// number of distinct filenames across both sets.
pub fn count(
    labels: &ShapeSet,
    preds: &ShapeSet,
    class_map: &ClassMap,
    threshold_iou: f64,
    threshold_conf: f64,
) -> Counts {
    let fnames: BTreeSet<&String> = labels.keys().chain(preds.keys()).collect();
    let total_images = fnames.len();
    let fnames: Vec<&String> = fnames.into_iter().collect();

    let mut counts = fnames
        .par_iter()
        .map(|fname| {
            let label_shapes = labels.get(*fname).map(Vec::as_slice).unwrap_or(&[]);
            let pred_shapes = preds.get(*fname).map(Vec::as_slice).unwrap_or(&[]);
            count_image(
                label_shapes,
                pred_shapes,
                class_map,
                threshold_iou,
                threshold_conf,
            )
        })
        .reduce(|| Counts::for_classes(class_map), Counts::merge);

    counts.total_images = total_images;
    counts
}

/// Count TP/FP/FN/GT for the shapes of a single image.
///
/// If any prediction on the image is a polygon the whole image is scored
/// in polygon mode: polygon predictions against all labels, with box
/// labels converted to 4-point polygons. Otherwise boxes are scored
/// against boxes directly. Shapes whose category is absent from the
/// class map are excluded from all counters.
pub fn count_image(
    label_shapes: &[Shape],
    pred_shapes: &[Shape],
    class_map: &ClassMap,
    threshold_iou: f64,
    threshold_conf: f64,
) -> Counts {
    let mut counts = Counts::for_classes(class_map);
    let polygon_mode = pred_shapes.iter().any(Shape::is_polygon);

    if polygon_mode {
        let mut labels: Vec<(usize, Vec<Point>)> = Vec::new();
        for shape in label_shapes {
            let Some(&class_id) = class_map.get(shape.category()) else {
                continue;
            };
            if let Shape::Polygon { points, .. } = shape {
                labels.push((class_id, points.clone()));
            }
        }
        // Box labels score against polygon predictions as 4-point polygons
        for shape in label_shapes {
            let Some(&class_id) = class_map.get(shape.category()) else {
                continue;
            };
            if let Some(corners) = shape.corners() {
                labels.push((class_id, rect_to_points(&corners)));
            }
        }

        let preds: Vec<(usize, f64, Vec<Point>)> = pred_shapes
            .iter()
            .filter_map(|shape| {
                let &class_id = class_map.get(shape.category())?;
                match shape {
                    Shape::Polygon { points, .. } => {
                        Some((class_id, shape.confidence(), points.clone()))
                    }
                    Shape::Rect { .. } => None,
                }
            })
            .collect();

        tally(
            &mut counts,
            &labels,
            &preds,
            threshold_iou,
            threshold_conf,
            |p, l| polygon_iou_matrix(p, l),
        );
    } else {
        let labels: Vec<(usize, Corners)> = label_shapes
            .iter()
            .filter_map(|shape| {
                let &class_id = class_map.get(shape.category())?;
                Some((class_id, shape.corners()?))
            })
            .collect();

        let preds: Vec<(usize, f64, Corners)> = pred_shapes
            .iter()
            .filter_map(|shape| {
                let &class_id = class_map.get(shape.category())?;
                Some((class_id, shape.confidence(), shape.corners()?))
            })
            .collect();

        tally(
            &mut counts,
            &labels,
            &preds,
            threshold_iou,
            threshold_conf,
            |p, l| calculate_iou_matrix(p, l),
        );
    }

    counts
}

/// Tally one image's shapes into the counters, one class at a time.
fn tally<G: Clone>(
    counts: &mut Counts,
    labels: &[(usize, G)],
    preds: &[(usize, f64, G)],
    threshold_iou: f64,
    threshold_conf: f64,
    overlap: impl Fn(&[G], &[G]) -> Vec<Vec<f64>>,
) {
    let class_ids: BTreeSet<usize> = labels
        .iter()
        .map(|(class_id, _)| *class_id)
        .chain(preds.iter().map(|(class_id, _, _)| *class_id))
        .collect();

    for &c in &class_ids {
        let class_labels: Vec<G> = labels
            .iter()
            .filter(|(class_id, _)| *class_id == c)
            .map(|(_, geom)| geom.clone())
            .collect();
        let class_preds: Vec<G> = preds
            .iter()
            .filter(|(class_id, conf, _)| *class_id == c && *conf >= threshold_conf)
            .map(|(_, _, geom)| geom.clone())
            .collect();

        let n_labels = class_labels.len() as u64;
        let n_preds = class_preds.len() as u64;

        counts.gt[c] += n_labels;
        if n_labels > 0 {
            counts.gt_img[c] += 1;
        }

        if n_labels == 0 && n_preds > 0 {
            counts.fp[c] += n_preds;
            counts.fp_img[c] += 1;
        }
        if n_preds == 0 && n_labels > 0 {
            counts.missed[c] += n_labels;
            counts.missed_img[c] += 1;
        }
        if n_labels == 0 || n_preds == 0 {
            continue;
        }

        // Rows are predictions, columns are labels
        let ious = overlap(&class_preds, &class_labels);

        let matched = ious
            .iter()
            .filter(|row| row_max(row) >= threshold_iou)
            .count() as u64;
        let missed_labels = (0..class_labels.len())
            .filter(|&j| col_max(&ious, j) < threshold_iou)
            .count() as u64;

        if missed_labels > 0 {
            counts.missed[c] += missed_labels;
            counts.missed_img[c] += 1;
        }
        if matched > 0 {
            counts.tp_img[c] += 1;
        } else {
            counts.fp_img[c] += 1;
        }
        counts.tp[c] += matched;
        counts.fp[c] += n_preds - matched;
    }
}

fn row_max(row: &[f64]) -> f64 {
    row.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn col_max(matrix: &[Vec<f64>], col: usize) -> f64 {
    matrix
        .iter()
        .map(|row| row[col])
        .fold(f64::NEG_INFINITY, f64::max)
}
