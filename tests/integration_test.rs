//! Integration tests for the complete evaluation pipeline.

use det_eval::evaluator::{precision_recall, sweep, EvalParams};
use det_eval::loader::load_from_string;
use det_eval::threshold::generate_threshold_range;
use det_eval::types::{ClassMap, Shape, ShapeSet, ALL_CLASSES};

fn shape_set(entries: Vec<(&str, Vec<Shape>)>) -> ShapeSet {
    entries
        .into_iter()
        .map(|(fname, shapes)| (fname.to_string(), shapes))
        .collect()
}

fn class_map(names: &[&str]) -> ClassMap {
    names
        .iter()
        .enumerate()
        .map(|(id, name)| (name.to_string(), id))
        .collect()
}

#[test]
fn test_perfect_predictions() {
    let labels = shape_set(vec![
        (
            "img1.png",
            vec![
                Shape::rect("person", [10.0, 10.0], [60.0, 60.0]),
                Shape::rect("person", [100.0, 100.0], [150.0, 150.0]),
            ],
        ),
        (
            "img2.png",
            vec![Shape::rect("car", [0.0, 0.0], [40.0, 30.0])],
        ),
    ]);
    let preds = shape_set(vec![
        (
            "img1.png",
            vec![
                Shape::rect_with_confidence("person", [10.0, 10.0], [60.0, 60.0], 0.95),
                Shape::rect_with_confidence("person", [100.0, 100.0], [150.0, 150.0], 0.9),
            ],
        ),
        (
            "img2.png",
            vec![Shape::rect_with_confidence("car", [0.0, 0.0], [40.0, 30.0], 0.85)],
        ),
    ]);
    let class_map = class_map(&["person", "car"]);

    let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    assert!((metrics.precision["person"] - 1.0).abs() < 1e-9);
    assert!((metrics.recall["person"] - 1.0).abs() < 1e-9);
    assert!((metrics.precision["car"] - 1.0).abs() < 1e-9);
    assert!((metrics.precision[ALL_CLASSES] - 1.0).abs() < 1e-9);
    assert_eq!(metrics.error_rate["person"], 0.0);
    assert_eq!(metrics.error_rate["car"], 0.0);
}

#[test]
fn test_no_predictions_zero_recall() {
    let labels = shape_set(vec![(
        "img1.png",
        vec![Shape::rect("person", [10.0, 10.0], [60.0, 60.0])],
    )]);
    let preds = ShapeSet::new();
    let class_map = class_map(&["person"]);

    let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    assert!(metrics.recall["person"] < 1e-9);
    assert!(metrics.precision["person"] < 1e-9);
    assert!((metrics.error_rate["person"] - 1.0).abs() < 1e-9);
}

#[test]
fn test_false_positive_only_class() {
    // No ground truth of class "b" anywhere, one confident prediction
    let labels = shape_set(vec![(
        "img1.png",
        vec![Shape::rect("a", [0.0, 0.0], [10.0, 10.0])],
    )]);
    let preds = shape_set(vec![(
        "img1.png",
        vec![
            Shape::rect_with_confidence("a", [0.0, 0.0], [10.0, 10.0], 0.9),
            Shape::rect_with_confidence("b", [50.0, 50.0], [60.0, 60.0], 0.9),
        ],
    )]);
    let class_map = class_map(&["a", "b"]);

    let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    assert!(metrics.precision["b"] < 1e-9);
    assert!(metrics.recall["b"] < 1e-9);
    // One TP and one FP across both classes
    assert!((metrics.precision[ALL_CLASSES] - 0.5).abs() < 1e-9);
}

#[test]
fn test_partial_recall() {
    let labels = shape_set(vec![(
        "img1.png",
        vec![
            Shape::rect("a", [0.0, 0.0], [10.0, 10.0]),
            Shape::rect("a", [100.0, 100.0], [110.0, 110.0]),
        ],
    )]);
    let preds = shape_set(vec![(
        "img1.png",
        vec![Shape::rect_with_confidence("a", [0.0, 0.0], [10.0, 10.0], 0.9)],
    )]);
    let class_map = class_map(&["a"]);

    let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    assert!((metrics.recall["a"] - 0.5).abs() < 1e-9);
    assert!((metrics.precision["a"] - 1.0).abs() < 1e-9);
}

#[test]
fn test_polygon_predictions_against_mixed_labels() {
    let labels = shape_set(vec![(
        "img1.png",
        vec![
            Shape::polygon(
                "dent",
                vec![[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]],
            ),
            Shape::rect("dent", [100.0, 100.0], [120.0, 120.0]),
        ],
    )]);
    let preds = shape_set(vec![(
        "img1.png",
        vec![
            Shape::polygon_with_confidence(
                "dent",
                vec![[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]],
                0.9,
            ),
            Shape::polygon_with_confidence(
                "dent",
                vec![[100.0, 100.0], [120.0, 100.0], [120.0, 120.0], [100.0, 120.0]],
                0.8,
            ),
        ],
    )]);
    let class_map = class_map(&["dent"]);

    let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    assert!((metrics.precision["dent"] - 1.0).abs() < 1e-9);
    assert!((metrics.recall["dent"] - 1.0).abs() < 1e-9);
}

#[test]
fn test_image_level_counting() {
    // Two predictions match one ground truth; at image level that is a
    // single TP event, so precision stays 1.0 either way but the raw
    // counters differ.
    let labels = shape_set(vec![(
        "img1.png",
        vec![Shape::rect("a", [0.0, 0.0], [10.0, 10.0])],
    )]);
    let preds = shape_set(vec![(
        "img1.png",
        vec![
            Shape::rect_with_confidence("a", [0.0, 0.0], [10.0, 10.0], 0.9),
            Shape::rect_with_confidence("a", [1.0, 1.0], [11.0, 11.0], 0.8),
        ],
    )]);
    let class_map = class_map(&["a"]);

    let instance =
        precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    let image = precision_recall(
        &labels,
        &preds,
        &class_map,
        &EvalParams {
            image_level: true,
            ..EvalParams::default()
        },
    )
    .unwrap();

    // Instance level double-counts the ground truth: 2 TP over 1 GT, clipped
    assert!((instance.recall["a"] - 1.0).abs() < 1e-9);
    assert!((image.recall["a"] - 1.0).abs() < 1e-9);
    assert!((image.precision["a"] - 1.0).abs() < 1e-9);
}

#[test]
fn test_error_rate_counts_images_with_misses() {
    let labels = shape_set(vec![
        (
            "img1.png",
            vec![Shape::rect("a", [0.0, 0.0], [10.0, 10.0])],
        ),
        (
            "img2.png",
            vec![Shape::rect("a", [0.0, 0.0], [10.0, 10.0])],
        ),
        (
            "img3.png",
            vec![Shape::rect("a", [0.0, 0.0], [10.0, 10.0])],
        ),
        ("img4.png", vec![]),
    ]);
    let preds = shape_set(vec![
        (
            "img1.png",
            vec![Shape::rect_with_confidence("a", [0.0, 0.0], [10.0, 10.0], 0.9)],
        ),
        (
            "img2.png",
            vec![Shape::rect_with_confidence("a", [50.0, 50.0], [60.0, 60.0], 0.9)],
        ),
    ]);
    let class_map = class_map(&["a"]);

    let metrics = precision_recall(&labels, &preds, &class_map, &EvalParams::default()).unwrap();
    // img2 (bad overlap) and img3 (no prediction) miss their ground truth
    assert!((metrics.error_rate["a"] - 2.0 / 4.0).abs() < 1e-9);
}

#[test]
fn test_recall_monotone_over_confidence_sweep() {
    let labels = shape_set(vec![(
        "img1.png",
        vec![
            Shape::rect("a", [0.0, 0.0], [10.0, 10.0]),
            Shape::rect("a", [50.0, 50.0], [60.0, 60.0]),
            Shape::rect("a", [100.0, 100.0], [110.0, 110.0]),
        ],
    )]);
    let preds = shape_set(vec![(
        "img1.png",
        vec![
            Shape::rect_with_confidence("a", [0.0, 0.0], [10.0, 10.0], 0.9),
            Shape::rect_with_confidence("a", [50.0, 50.0], [60.0, 60.0], 0.5),
            Shape::rect_with_confidence("a", [100.0, 100.0], [110.0, 110.0], 0.2),
        ],
    )]);
    let class_map = class_map(&["a"]);

    let confidences = generate_threshold_range(0.0, 1.0, 20).unwrap();
    let result = sweep(
        &labels,
        &preds,
        &class_map,
        &confidences,
        &EvalParams::default(),
    )
    .unwrap();

    let recall_curve = &result.recall["a"];
    assert_eq!(recall_curve.len(), 20);
    for window in recall_curve.windows(2) {
        assert!(
            window[1].1 <= window[0].1 + 1e-12,
            "recall must not increase with confidence: {:?}",
            window
        );
    }
    // Sweep points stay in threshold order
    for (point, &conf) in recall_curve.iter().zip(&confidences) {
        assert_eq!(point.0, conf);
    }
}

#[test]
fn test_load_then_evaluate() {
    let label_records = "img1.png;car;;rect;upper left;0;0\n\
                         img1.png;car;;rect;lower right;10;10\n";
    let pred_records = "img1.png;car;0.9;rect;upper left;0;0\n\
                        img1.png;car;0.9;rect;lower right;10;10\n";

    let labels = load_from_string(label_records, None).unwrap();
    let preds = load_from_string(pred_records, Some(&labels.class_map)).unwrap();

    let metrics = precision_recall(
        &labels.shapes,
        &preds.shapes,
        &labels.class_map,
        &EvalParams::default(),
    )
    .unwrap();
    assert!((metrics.precision["car"] - 1.0).abs() < 1e-9);
    assert!((metrics.recall["car"] - 1.0).abs() < 1e-9);
}
