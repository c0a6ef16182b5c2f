use serde::{Deserialize, Serialize};

use crate::model::TimelineRecord;

/// The world-time extent mapped onto the canvas width at scale 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min: f64,
    pub max: f64,
}

impl TimeRange {
    /// Range of an empty record set.
    pub const EMPTY: TimeRange = TimeRange { min: 0.0, max: 0.0 };

    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Extremes of the given records (start and end times), padded on both
    /// sides by `max(span * padding_fraction, min_padding_ms)`.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a TimelineRecord>,
        padding_fraction: f64,
        min_padding_ms: f64,
    ) -> Self {
        let mut lo = i64::MAX;
        let mut hi = i64::MIN;
        for r in records {
            lo = lo.min(r.time_ms);
            hi = hi.max(r.last_time_ms());
        }
        if lo > hi {
            return Self::EMPTY;
        }
        let (lo, hi) = (lo as f64, hi as f64);
        let pad = ((hi - lo) * padding_fraction).max(min_padding_ms);
        Self {
            min: lo - pad,
            max: hi + pad,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        let span = self.span();
        span.is_nan() || span <= 0.0
    }

    /// The range the mapper uses: a degenerate range is widened to
    /// `fallback_span` centred on its midpoint.
    pub fn effective(&self, fallback_span: f64) -> Self {
        if self.is_degenerate() {
            let mid = if self.min.is_finite() { self.min } else { 0.0 };
            let half = fallback_span / 2.0;
            Self {
                min: mid - half,
                max: mid + half,
            }
        } else {
            *self
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.min && t <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordSet;
    use linescope_protocol::RecordInput;

    fn set(times: &[f64]) -> RecordSet {
        let inputs: Vec<_> = times
            .iter()
            .map(|&t| RecordInput::point(t, "BS", "scan"))
            .collect();
        RecordSet::from_inputs(&inputs)
    }

    #[test]
    fn five_percent_padding() {
        let records = set(&[0.0, 1_000.0, 2_000.0]);
        let range = TimeRange::from_records(records.records(), 0.05, 0.0);
        assert!((range.min - -100.0).abs() < 1e-9);
        assert!((range.max - 2_100.0).abs() < 1e-9);
    }

    #[test]
    fn padding_floor_wins_when_larger() {
        let records = set(&[0.0, 1_000.0, 2_000.0]);
        let range = TimeRange::from_records(records.records(), 0.05, 60_000.0);
        assert!((range.min - -60_000.0).abs() < 1e-9);
        assert!((range.max - 62_000.0).abs() < 1e-9);
    }

    #[test]
    fn durations_extend_the_range() {
        let inputs = vec![RecordInput {
            end_timestamp: Some(10_000.0),
            ..RecordInput::point(0.0, "BA", "jam")
        }];
        let records = RecordSet::from_inputs(&inputs);
        let range = TimeRange::from_records(records.records(), 0.0, 0.0);
        assert_eq!(range, TimeRange::new(0.0, 10_000.0));
    }

    #[test]
    fn empty_and_single_record() {
        assert_eq!(TimeRange::from_records(std::iter::empty(), 0.05, 60_000.0), TimeRange::EMPTY);

        let records = set(&[5_000.0]);
        let range = TimeRange::from_records(records.records(), 0.05, 0.0);
        assert!(range.is_degenerate());
        let eff = range.effective(3_600_000.0);
        assert!((eff.min - (5_000.0 - 1_800_000.0)).abs() < 1e-9);
        assert!((eff.span() - 3_600_000.0).abs() < 1e-9);
    }
}
