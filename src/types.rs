//! Core data types for annotations and evaluation results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pseudo-class key under which aggregate precision/recall is reported.
pub const ALL_CLASSES: &str = "all";

/// Axis-aligned box corners `[x1, y1, x2, y2]` with `x1 <= x2` and `y1 <= y2`.
pub type Corners = [f64; 4];

/// A 2D point `[x, y]`.
pub type Point = [f64; 2];

/// A single annotated shape, either a bounding box or a polygon.
///
/// Ground-truth shapes carry an implicit confidence of 1.0; prediction
/// shapes carry the model score in [0.0, 1.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Rectangular annotation given by its upper-left and lower-right corners.
    Rect {
        category: String,
        confidence: f64,
        up_left: Point,
        bottom_right: Point,
    },
    /// Polygonal annotation given by its vertices in order.
    ///
    /// Fewer than 3 vertices is a degenerate polygon and scores zero
    /// overlap against everything.
    Polygon {
        category: String,
        confidence: f64,
        points: Vec<Point>,
    },
}

impl Shape {
    /// Create a ground-truth rectangle (confidence 1.0).
    pub fn rect(category: impl Into<String>, up_left: Point, bottom_right: Point) -> Self {
        Self::rect_with_confidence(category, up_left, bottom_right, 1.0)
    }

    /// Create a predicted rectangle with a confidence score.
    pub fn rect_with_confidence(
        category: impl Into<String>,
        up_left: Point,
        bottom_right: Point,
        confidence: f64,
    ) -> Self {
        Shape::Rect {
            category: category.into(),
            confidence,
            up_left,
            bottom_right,
        }
    }

    /// Create a ground-truth polygon (confidence 1.0).
    pub fn polygon(category: impl Into<String>, points: Vec<Point>) -> Self {
        Self::polygon_with_confidence(category, points, 1.0)
    }

    /// Create a predicted polygon with a confidence score.
    pub fn polygon_with_confidence(
        category: impl Into<String>,
        points: Vec<Point>,
        confidence: f64,
    ) -> Self {
        Shape::Polygon {
            category: category.into(),
            confidence,
            points,
        }
    }

    /// The categorical class name of this shape.
    pub fn category(&self) -> &str {
        match self {
            Shape::Rect { category, .. } | Shape::Polygon { category, .. } => category,
        }
    }

    /// The confidence score (1.0 for ground truth).
    pub fn confidence(&self) -> f64 {
        match self {
            Shape::Rect { confidence, .. } | Shape::Polygon { confidence, .. } => *confidence,
        }
    }

    /// Whether this shape is a polygon.
    pub fn is_polygon(&self) -> bool {
        matches!(self, Shape::Polygon { .. })
    }

    /// Box corners `[x1, y1, x2, y2]`, or `None` for polygons.
    pub fn corners(&self) -> Option<Corners> {
        match self {
            Shape::Rect {
                up_left,
                bottom_right,
                ..
            } => Some([up_left[0], up_left[1], bottom_right[0], bottom_right[1]]),
            Shape::Polygon { .. } => None,
        }
    }
}

/// Mapping from image filename to the shapes annotated on that image.
///
/// Used for both the label set and the prediction set; treated as
/// immutable for the duration of one evaluation call.
pub type ShapeSet = HashMap<String, Vec<Shape>>;

/// Mapping from category name to integer class id.
///
/// Defines the universe of classes scored; shapes whose category is
/// absent from the map are silently excluded from all counters.
pub type ClassMap = HashMap<String, usize>;

/// Confusion counters for one evaluation at a fixed threshold pair.
///
/// Counters are fixed-size tables indexed by class id, zeroed for every
/// evaluation. Instance counters sum raw shape counts; image counters sum
/// a 0/1 event per image per class. Partial counts from independent
/// images merge by elementwise addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    /// Number of distinct images across the label and prediction sets.
    pub total_images: usize,
    /// True positives per class id.
    pub tp: Vec<u64>,
    /// False positives per class id.
    pub fp: Vec<u64>,
    /// Ground-truth instances per class id.
    pub gt: Vec<u64>,
    /// False negatives (missed ground truths) per class id.
    pub missed: Vec<u64>,
    /// Images with at least one true positive, per class id.
    pub tp_img: Vec<u64>,
    /// Images with predictions but no match, per class id.
    pub fp_img: Vec<u64>,
    /// Images with at least one ground truth, per class id.
    pub gt_img: Vec<u64>,
    /// Images with at least one missed ground truth, per class id.
    pub missed_img: Vec<u64>,
}

impl Counts {
    /// Create zeroed counters sized for every class id in the map.
    pub fn for_classes(class_map: &ClassMap) -> Self {
        let size = class_map.values().max().map_or(0, |&id| id + 1);
        Self {
            total_images: 0,
            tp: vec![0; size],
            fp: vec![0; size],
            gt: vec![0; size],
            missed: vec![0; size],
            tp_img: vec![0; size],
            fp_img: vec![0; size],
            gt_img: vec![0; size],
            missed_img: vec![0; size],
        }
    }

    /// Merge another partial count into this one by elementwise summation.
    pub fn merge(mut self, other: Counts) -> Counts {
        fn add(a: &mut [u64], b: &[u64]) {
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
        }
        self.total_images += other.total_images;
        add(&mut self.tp, &other.tp);
        add(&mut self.fp, &other.fp);
        add(&mut self.gt, &other.gt);
        add(&mut self.missed, &other.missed);
        add(&mut self.tp_img, &other.tp_img);
        add(&mut self.fp_img, &other.fp_img);
        add(&mut self.gt_img, &other.gt_img);
        add(&mut self.missed_img, &other.missed_img);
        self
    }
}

/// Precision, recall and image-level error rate at one threshold pair.
///
/// `precision` and `recall` additionally carry the [`ALL_CLASSES`] key,
/// computed from the unweighted TP/FP/GT sums over all non-skipped
/// classes rather than an average of per-class values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: HashMap<String, f64>,
    pub recall: HashMap<String, f64>,
    pub error_rate: HashMap<String, f64>,
}

/// Per-class metric curves over a confidence-threshold sweep.
///
/// Each curve is the ordered sequence of `(confidence, value)` points
/// consumed by an external plotting step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    /// The IoU threshold the sweep was evaluated at.
    pub threshold_iou: f64,
    /// Whether image-granularity counters were used for precision/recall.
    pub image_level: bool,
    /// Precision-confidence curve per class (plus [`ALL_CLASSES`]).
    pub precision: HashMap<String, Vec<(f64, f64)>>,
    /// Recall-confidence curve per class (plus [`ALL_CLASSES`]).
    pub recall: HashMap<String, Vec<(f64, f64)>>,
    /// Error-rate-confidence curve per class.
    pub error_rate: HashMap<String, Vec<(f64, f64)>>,
}

impl SweepResult {
    /// Serialize the curves to pretty-printed JSON for downstream plotting.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
