//! Confidence-score thresholding utilities.

use crate::error::{DetEvalError, Result};
use crate::types::Shape;

/// Filter shapes by confidence score threshold.
///
/// Returns a new vector containing only shapes with confidence >=
/// `threshold`. Ground-truth shapes carry confidence 1.0 and always pass.
///
/// # Errors
///
/// Returns an error if the threshold is outside [0.0, 1.0].
///
/// # Example
///
/// ```
/// use det_eval::threshold::filter_by_confidence;
/// use det_eval::types::Shape;
///
/// let shapes = vec![
///     Shape::rect_with_confidence("car", [0.0, 0.0], [10.0, 10.0], 0.9),
///     Shape::rect_with_confidence("car", [5.0, 5.0], [15.0, 15.0], 0.3),
/// ];
/// let kept = filter_by_confidence(&shapes, 0.5).unwrap();
/// assert_eq!(kept.len(), 1);
/// ```
pub fn filter_by_confidence(shapes: &[Shape], threshold: f64) -> Result<Vec<Shape>> {
    validate_threshold(threshold)?;

    Ok(shapes
        .iter()
        .filter(|shape| shape.confidence() >= threshold)
        .cloned()
        .collect())
}

/// Generate evenly-spaced threshold values for a confidence sweep.
///
/// # Example
///
/// ```
/// use det_eval::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.0, 1.0, 20).unwrap();
/// assert_eq!(thresholds.len(), 20);
/// assert_eq!(thresholds[0], 0.0);
/// assert_eq!(thresholds[19], 1.0);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(DetEvalError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string(),
        ));
    }

    validate_threshold(start)?;
    validate_threshold(end)?;

    if start > end {
        return Err(DetEvalError::InvalidThreshold(format!(
            "Start threshold ({}) must be <= end threshold ({})",
            start, end
        )));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps).map(|i| start + step_size * i as f64).collect())
}

/// Validate that a threshold is in the range [0.0, 1.0].
pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(DetEvalError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}
