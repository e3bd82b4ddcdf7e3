//! Statistics tracking for annotation loading.
//!
//! Records which annotation rows were excluded while building a shape
//! set, so silently-skipped input stays observable.

use serde::{Deserialize, Serialize};

/// Counters collected while parsing annotation records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadStats {
    /// Total number of records read.
    pub total_records: usize,

    /// Records skipped due to an unrecognized shape kind or sub-tag.
    pub skipped_unknown_kind: usize,

    /// Records skipped due to unparsable coordinate values.
    pub skipped_malformed: usize,

    /// Polygon records dropped because the x/y value lists differ in length,
    /// or rect records missing their corner pair.
    pub skipped_unpaired: usize,

    /// Number of shapes successfully constructed.
    pub loaded_shapes: usize,
}

impl LoadStats {
    /// Create a new `LoadStats` with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records excluded for any reason.
    pub fn skipped(&self) -> usize {
        self.skipped_unknown_kind + self.skipped_malformed + self.skipped_unpaired
    }
}
