use linescope_protocol::{Color, SharedStr};

/// A lane is the fundamental layout primitive: a horizontal band holding
/// every visible record that shares one grouping key.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub key: SharedStr,
    /// Display position, top to bottom.
    pub index: usize,
    /// Human-readable title for the label column.
    pub title: SharedStr,
    /// Station the lane belongs to (first record's source for category lanes).
    pub source_id: SharedStr,
    /// Lane color from station metadata, if any.
    pub color: Option<Color>,
    /// Positions into the record set, in arrival order.
    pub records: Vec<usize>,
    /// The same positions sorted by start time (ties keep arrival order).
    pub time_order: Vec<usize>,
    /// Longest record duration in the lane. Time-window queries on
    /// `time_order` widen their lower bound by this much so long bars that
    /// start off-screen are still found.
    pub max_duration_ms: f64,
}

impl Lane {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
