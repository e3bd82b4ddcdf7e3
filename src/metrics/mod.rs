//! Geometric overlap calculation for boxes and polygons.

pub mod iou;
pub mod polygon;

pub use iou::{calculate_iou, calculate_iou_matrix};
pub use polygon::{polygon_iou, polygon_iou_matrix, rect_to_points};
