use std::collections::BTreeMap;

use linescope_protocol::{Color, RecordInput, SharedStr};

/// Stable identifier of a record: its position in the input sequence.
pub type RecordId = u64;

/// Largest timestamp magnitude accepted (the ECMAScript `Date` range).
const MAX_ABS_TIME_MS: f64 = 8.64e15;

/// A validated, plottable record. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRecord {
    pub id: RecordId,
    pub time_ms: i64,
    pub end_time_ms: Option<i64>,
    pub source_id: SharedStr,
    pub category: Option<SharedStr>,
    pub code: Option<SharedStr>,
    pub label: SharedStr,
    pub color: Option<Color>,
    pub is_highlighted: bool,
    pub payload: BTreeMap<String, String>,
}

impl TimelineRecord {
    /// Validate one input record. Returns `None` when the start timestamp is
    /// missing or not a finite, representable epoch time.
    ///
    /// An unusable end timestamp (non-finite, or before the start) only
    /// demotes the record to a point; an unparsable color falls back to the
    /// lane color.
    pub fn from_input(id: RecordId, input: &RecordInput) -> Option<Self> {
        let time_ms = to_epoch_ms(input.timestamp?)?;
        let end_time_ms = input
            .end_timestamp
            .and_then(to_epoch_ms)
            .filter(|&end| end >= time_ms);

        Some(Self {
            id,
            time_ms,
            end_time_ms,
            source_id: SharedStr::from(input.source_id.as_str()),
            category: input.category.as_deref().map(SharedStr::from),
            code: input.code.as_deref().map(SharedStr::from),
            label: SharedStr::from(input.label.as_str()),
            color: input.color.as_deref().and_then(Color::from_hex),
            is_highlighted: input.is_highlighted,
            payload: input.payload.clone(),
        })
    }

    /// Duration in milliseconds; zero for point records.
    pub fn duration_ms(&self) -> i64 {
        self.end_time_ms.map_or(0, |end| end - self.time_ms)
    }

    /// Last instant covered by the record.
    pub fn last_time_ms(&self) -> i64 {
        self.end_time_ms.unwrap_or(self.time_ms)
    }
}

fn to_epoch_ms(t: f64) -> Option<i64> {
    (t.is_finite() && t.abs() <= MAX_ABS_TIME_MS).then(|| t.round() as i64)
}

/// The validated record set plus how many inputs were rejected.
///
/// Records keep input order, so a position in `records()` also orders
/// records by arrival.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<TimelineRecord>,
    dropped: usize,
}

impl RecordSet {
    pub fn from_inputs(inputs: &[RecordInput]) -> Self {
        let mut records = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            if let Some(record) = TimelineRecord::from_input(i as RecordId, input) {
                records.push(record);
            }
        }
        let dropped = inputs.len() - records.len();
        Self { records, dropped }
    }

    pub fn records(&self) -> &[TimelineRecord] {
        &self.records
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id. Ids are ascending, so this is a binary search.
    pub fn get(&self, id: RecordId) -> Option<&TimelineRecord> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.records[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_and_missing_timestamps_are_dropped() {
        let inputs = vec![
            RecordInput::point(1_000.0, "BS", "ok"),
            RecordInput::point(f64::NAN, "BS", "nan"),
            RecordInput {
                timestamp: None,
                ..RecordInput::point(0.0, "BA", "missing")
            },
            RecordInput::point(f64::INFINITY, "BA", "inf"),
            RecordInput::point(2_000.0, "BA", "ok"),
        ];
        let set = RecordSet::from_inputs(&inputs);
        assert_eq!(set.len(), 2);
        assert_eq!(set.dropped(), 3);
        let ids: Vec<_> = set.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 4]);
        assert!(set.get(4).is_some());
        assert!(set.get(1).is_none());
    }

    #[test]
    fn bad_end_timestamp_demotes_to_point() {
        let input = RecordInput {
            end_timestamp: Some(500.0),
            ..RecordInput::point(1_000.0, "FV", "reset before start")
        };
        let rec = TimelineRecord::from_input(0, &input);
        assert_eq!(rec.as_ref().map(|r| r.end_time_ms), Some(None));
        assert_eq!(rec.map(|r| r.duration_ms()), Some(0));
    }

    #[test]
    fn duration_record() {
        let input = RecordInput {
            end_timestamp: Some(61_000.4),
            color: Some("#ef4444".into()),
            ..RecordInput::point(1_000.0, "LA", "laser fault")
        };
        let rec = TimelineRecord::from_input(3, &input);
        assert_eq!(rec.as_ref().map(TimelineRecord::duration_ms), Some(60_000));
        assert_eq!(rec.as_ref().map(TimelineRecord::last_time_ms), Some(61_000));
        assert!(rec.is_some_and(|r| r.color.is_some()));
    }

    #[test]
    fn fractional_timestamps_round() {
        let rec = TimelineRecord::from_input(0, &RecordInput::point(1_499.6, "BS", "x"));
        assert_eq!(rec.map(|r| r.time_ms), Some(1_500));
    }
}
