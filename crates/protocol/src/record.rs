use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// One record as delivered by the analysis backend.
///
/// Event-log entries and error occurrences both arrive in this shape. Nothing
/// is validated here: timestamps may be missing or non-finite and colors may
/// be malformed. The core decides what is plottable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordInput {
    /// Start time, milliseconds since the Unix epoch. Anything that is not a
    /// JSON number reads as `None`.
    #[serde(deserialize_with = "lenient_ms")]
    pub timestamp: Option<f64>,
    /// End time for records with a duration (cleared errors).
    #[serde(deserialize_with = "lenient_ms")]
    pub end_timestamp: Option<f64>,
    /// Station code (`BS`, `BA`, ...).
    pub source_id: String,
    /// Event category (`Process`, `Scan`, ...).
    pub category: Option<String>,
    /// Error or event code.
    pub code: Option<String>,
    /// Short message shown in tooltips.
    pub label: String,
    /// CSS hex color overriding the lane color.
    pub color: Option<String>,
    /// Flagged record (error, anomaly); drawn with a glow.
    pub is_highlighted: bool,
    /// Opaque key/value pairs carried through to the tooltip.
    pub payload: BTreeMap<String, String>,
}

impl RecordInput {
    /// Convenience constructor for a point record.
    pub fn point(timestamp: f64, source_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp),
            source_id: source_id.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeMs {
    Number(f64),
    Other(IgnoredAny),
}

/// Accept a number; map strings, null, objects and the rest to `None` so one
/// malformed timestamp drops its record instead of failing the batch.
fn lenient_ms<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match MaybeMs::deserialize(deserializer)? {
        MaybeMs::Number(ms) => Some(ms),
        MaybeMs::Other(_) => None,
    })
}
