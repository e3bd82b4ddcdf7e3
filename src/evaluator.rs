//! Aggregation of confusion counts into precision, recall and error rate,
//! and the confidence-threshold sweep that produces metric curves.

use crate::error::{DetEvalError, Result};
use crate::matching::count;
use crate::threshold::validate_threshold;
use crate::types::{ClassMap, ClassMetrics, Counts, ShapeSet, SweepResult, ALL_CLASSES};
use log::debug;
use rayon::prelude::*;
use std::collections::HashSet;

/// Guards division by zero when a class has no predictions or no ground
/// truth; paired with clipping to at most 1.0.
const EPSILON: f64 = 1e-16;

/// Parameters for one precision/recall evaluation.
#[derive(Debug, Clone)]
pub struct EvalParams {
    /// Minimum IoU for a prediction-label pair to count as matched.
    pub threshold_iou: f64,
    /// Minimum confidence for a prediction to be considered.
    pub threshold_conf: f64,
    /// Category names excluded from per-class and aggregate reporting.
    pub skip_classes: HashSet<String>,
    /// Use image-granularity counters for precision and recall.
    pub image_level: bool,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            threshold_iou: 0.5,
            threshold_conf: 0.1,
            skip_classes: HashSet::new(),
            image_level: false,
        }
    }
}

/// Calculate per-class precision, recall and image-level error rate at
/// one threshold pair.
///
/// Precision and recall are computed from instance-granularity counters,
/// or image-granularity ones when `params.image_level` is set; the error
/// rate always uses image-granularity false negatives. The aggregate
/// [`ALL_CLASSES`] entry is derived from the unweighted TP/FP/GT sums
/// over all non-skipped classes.
///
/// # Errors
///
/// Returns an error if either threshold is outside [0.0, 1.0] or the
/// class map is empty.
pub fn precision_recall(
    labels: &ShapeSet,
    preds: &ShapeSet,
    class_map: &ClassMap,
    params: &EvalParams,
) -> Result<ClassMetrics> {
    validate_threshold(params.threshold_iou)?;
    validate_threshold(params.threshold_conf)?;
    if class_map.is_empty() {
        return Err(DetEvalError::EmptyDataset(
            "class map has no classes".to_string(),
        ));
    }

    let counts = count(
        labels,
        preds,
        class_map,
        params.threshold_iou,
        params.threshold_conf,
    );
    Ok(aggregate(&counts, class_map, params))
}

/// Derive metrics from already-summed counts.
fn aggregate(counts: &Counts, class_map: &ClassMap, params: &EvalParams) -> ClassMetrics {
    debug!(
        "threshold_iou: {}, threshold_conf: {}",
        params.threshold_iou, params.threshold_conf
    );

    let mut names: Vec<(&String, usize)> = class_map
        .iter()
        .map(|(name, &id)| (name, id))
        .collect();
    names.sort();

    let mut metrics = ClassMetrics::default();
    let (mut total_tp, mut total_fp, mut total_gt) = (0u64, 0u64, 0u64);

    for (name, id) in names {
        if params.skip_classes.contains(name) {
            continue;
        }
        let (tp, fp, gt) = if params.image_level {
            (counts.tp_img[id], counts.fp_img[id], counts.gt_img[id])
        } else {
            (counts.tp[id], counts.fp[id], counts.gt[id])
        };

        let precision = clipped_ratio(tp, tp + fp);
        let recall = clipped_ratio(tp, gt);
        let error_rate = if counts.total_images == 0 {
            0.0
        } else {
            counts.missed_img[id] as f64 / counts.total_images as f64
        };
        debug!(
            "class {}: error rate: {:.4}, precision: {:.4}, recall: {:.4}",
            name, error_rate, precision, recall
        );

        metrics.precision.insert(name.clone(), precision);
        metrics.recall.insert(name.clone(), recall);
        metrics.error_rate.insert(name.clone(), error_rate);

        total_tp += tp;
        total_fp += fp;
        total_gt += gt;
    }

    metrics.precision.insert(
        ALL_CLASSES.to_string(),
        clipped_ratio(total_tp, total_tp + total_fp),
    );
    metrics
        .recall
        .insert(ALL_CLASSES.to_string(), clipped_ratio(total_tp, total_gt));

    metrics
}

fn clipped_ratio(numerator: u64, denominator: u64) -> f64 {
    (numerator as f64 / (denominator as f64 + EPSILON)).min(1.0)
}

/// Evaluate precision, recall and error rate across a sweep of
/// confidence thresholds, producing per-class metric curves.
///
/// Threshold evaluations are independent and run on rayon workers; the
/// output sequences come back in the order of `confidences`.
pub fn sweep(
    labels: &ShapeSet,
    preds: &ShapeSet,
    class_map: &ClassMap,
    confidences: &[f64],
    params: &EvalParams,
) -> Result<SweepResult> {
    let per_threshold: Vec<ClassMetrics> = confidences
        .par_iter()
        .map(|&conf| {
            let point_params = EvalParams {
                threshold_conf: conf,
                ..params.clone()
            };
            precision_recall(labels, preds, class_map, &point_params)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut result = SweepResult {
        threshold_iou: params.threshold_iou,
        image_level: params.image_level,
        ..Default::default()
    };
    for (&conf, metrics) in confidences.iter().zip(&per_threshold) {
        for (name, &value) in &metrics.precision {
            result
                .precision
                .entry(name.clone())
                .or_default()
                .push((conf, value));
        }
        for (name, &value) in &metrics.recall {
            result
                .recall
                .entry(name.clone())
                .or_default()
                .push((conf, value));
        }
        for (name, &value) in &metrics.error_rate {
            result
                .error_rate
                .entry(name.clone())
                .or_default()
                .push((conf, value));
        }
    }

    Ok(result)
}
