//! # det-eval
//!
//! A Rust library for evaluating object-detection and segmentation
//! predictions against ground-truth annotations.
//!
//! The engine computes precision, recall and image-level error rate per
//! class and for all classes combined, across sweeps of confidence and
//! IoU thresholds, for rectangular and polygonal shapes.
//!
//! ## Features
//!
//! - Axis-aligned box IoU (closed form) and polygon IoU (geometric
//!   intersection/union with invalid-geometry repair)
//! - Per-image, per-class matching and TP/FP/FN/GT counting at instance
//!   and image granularity
//! - Precision/recall/error-rate aggregation with division-by-zero
//!   guards and clipping
//! - Confidence-threshold sweeps producing per-class metric curves,
//!   parallelized with rayon
//! - Parsing of semicolon-separated annotation records into shape sets
//!
//! ## Quick Start
//!
//! ```rust
//! use det_eval::evaluator::{precision_recall, EvalParams};
//! use det_eval::types::{ClassMap, Shape, ShapeSet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let labels: ShapeSet = [(
//!     "img1.png".to_string(),
//!     vec![Shape::rect("car", [0.0, 0.0], [10.0, 10.0])],
//! )]
//! .into();
//! let preds: ShapeSet = [(
//!     "img1.png".to_string(),
//!     vec![Shape::rect_with_confidence("car", [0.0, 0.0], [10.0, 10.0], 0.9)],
//! )]
//! .into();
//! let class_map: ClassMap = [("car".to_string(), 0)].into();
//!
//! let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default())?;
//! assert_eq!(metrics.precision["car"], 1.0);
//! assert_eq!(metrics.recall["car"], 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! The confidence sweep collects the same metrics over an axis of
//! threshold values; the resulting `(confidence, value)` sequences are
//! the precision-, recall- and error-confidence curves consumed by an
//! external plotting step.

pub mod error;
pub mod evaluator;
pub mod loader;
pub mod matching;
pub mod metrics;
pub mod stats;
pub mod threshold;
pub mod types;

// Re-export commonly used types and functions
pub use error::{DetEvalError, Result};
pub use evaluator::{precision_recall, sweep, EvalParams};
pub use loader::{load_from_file, load_from_string, LoadedSet};
pub use matching::count;
pub use metrics::{calculate_iou, calculate_iou_matrix, polygon_iou, polygon_iou_matrix};
pub use threshold::{filter_by_confidence, generate_threshold_range};
pub use types::{ClassMap, ClassMetrics, Counts, Shape, ShapeSet, SweepResult, ALL_CLASSES};
