//! Parsing of annotation records into shape sets.
//!
//! Records are semicolon-separated rows of the form
//! `filename;category;confidence;kind;tag;coords...`. A `rect` shape is
//! one `upper left` row followed by one `lower right` row; a `polygon`
//! shape is one `x values` row followed by one `y values` row of equal
//! length. Rows that cannot form a shape are skipped, counted in
//! [`LoadStats`] and logged; they never fail the load.

use crate::error::{DetEvalError, Result};
use crate::stats::LoadStats;
use crate::types::{ClassMap, Shape, ShapeSet};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// The outcome of parsing one annotation file.
#[derive(Debug, Clone, Default)]
pub struct LoadedSet {
    /// Shapes grouped by image filename.
    pub shapes: ShapeSet,
    /// Category name to class id, in order of first appearance.
    pub class_map: ClassMap,
    /// What was read and what was excluded.
    pub stats: LoadStats,
}

/// Load annotation records from a file.
///
/// Pass the class map from the label file when loading predictions so
/// both sets share ids; with `None` a fresh map is built in order of
/// first appearance. A missing or unreadable file is an error.
pub fn load_from_file<P: AsRef<Path>>(path: P, class_map: Option<&ClassMap>) -> Result<LoadedSet> {
    let data = fs::read_to_string(path)?;
    load_from_string(&data, class_map)
}

/// Load annotation records from a string.
///
/// # Example
///
/// ```
/// use det_eval::loader::load_from_string;
///
/// let records = "img1.png;car;0.9;rect;upper left;10;20\n\
///                img1.png;car;0.9;rect;lower right;50;60\n";
/// let loaded = load_from_string(records, None).unwrap();
/// assert_eq!(loaded.shapes["img1.png"].len(), 1);
/// assert_eq!(loaded.class_map["car"], 0);
/// ```
pub fn load_from_string(data: &str, class_map: Option<&ClassMap>) -> Result<LoadedSet> {
    let mut loaded = LoadedSet::default();
    let extend_map = class_map.is_none();
    if let Some(map) = class_map {
        loaded.class_map = map.clone();
    }

    // A rect's corner rows and a polygon's x/y rows arrive back to back.
    let mut pending_rect: Option<(Row, [f64; 2])> = None;
    let mut pending_poly: Option<(Row, Vec<f64>)> = None;

    for (line_no, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        loaded.stats.total_records += 1;

        let row = Row::parse(line, line_no + 1)?;
        let Some(values) = row.values() else {
            loaded.stats.skipped_malformed += 1;
            warn!("line {}: unparsable coordinates, skipping", line_no + 1);
            continue;
        };

        match (row.kind.as_str(), row.tag.as_str()) {
            ("rect", "upper left") => {
                if values.len() == 2 {
                    pending_rect = Some((row, [values[0], values[1]]));
                } else {
                    loaded.stats.skipped_malformed += 1;
                }
            }
            ("rect", "lower right") => match pending_rect.take() {
                Some((start, up_left)) if values.len() == 2 => {
                    let shape = Shape::rect_with_confidence(
                        start.category.clone(),
                        up_left,
                        [values[0], values[1]],
                        start.confidence,
                    );
                    push_shape(&mut loaded, start, shape, extend_map);
                }
                _ => {
                    loaded.stats.skipped_unpaired += 1;
                    warn!("line {}: lower right without upper left", line_no + 1);
                }
            },
            ("polygon", "x values") => {
                pending_poly = Some((row, values));
            }
            ("polygon", "y values") => match pending_poly.take() {
                Some((start, xs)) if xs.len() == values.len() => {
                    let points = xs.iter().zip(&values).map(|(&x, &y)| [x, y]).collect();
                    let shape = Shape::polygon_with_confidence(
                        start.category.clone(),
                        points,
                        start.confidence,
                    );
                    push_shape(&mut loaded, start, shape, extend_map);
                }
                _ => {
                    loaded.stats.skipped_unpaired += 1;
                    warn!("line {}: y values without matching x values", line_no + 1);
                }
            },
            (kind, tag) => {
                loaded.stats.skipped_unknown_kind += 1;
                debug!(
                    "line {}: unrecognized kind/tag '{};{}', skipping",
                    line_no + 1,
                    kind,
                    tag
                );
            }
        }
    }

    Ok(loaded)
}

fn push_shape(loaded: &mut LoadedSet, row: Row, shape: Shape, extend_map: bool) {
    if extend_map && !loaded.class_map.contains_key(&row.category) {
        let next_id = loaded.class_map.len();
        loaded.class_map.insert(row.category.clone(), next_id);
    }
    loaded.stats.loaded_shapes += 1;
    loaded.shapes.entry(row.fname).or_default().push(shape);
}

/// One parsed record row, coordinates still raw.
#[derive(Debug, Clone)]
struct Row {
    fname: String,
    category: String,
    confidence: f64,
    kind: String,
    tag: String,
    raw_values: Vec<String>,
}

impl Row {
    fn parse(line: &str, line_no: usize) -> Result<Row> {
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < 5 {
            return Err(DetEvalError::InvalidRecord(format!(
                "line {}: expected at least 5 fields, got {}",
                line_no,
                fields.len()
            )));
        }
        Ok(Row {
            fname: fields[0].to_string(),
            category: fields[1].to_string(),
            // Label files leave this column empty; treat as certainty
            confidence: fields[2].trim().parse().unwrap_or(1.0),
            kind: fields[3].trim().to_string(),
            tag: fields[4].trim().to_string(),
            raw_values: fields[5..].iter().map(|s| s.to_string()).collect(),
        })
    }

    fn values(&self) -> Option<Vec<f64>> {
        self.raw_values
            .iter()
            .map(|v| v.trim().parse().ok())
            .collect()
    }
}
