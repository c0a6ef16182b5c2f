use std::collections::BTreeMap;

use linescope_protocol::{Color, SharedStr, StationCatalog};
use serde::{Deserialize, Serialize};

use crate::model::{Lane, TimelineRecord};

/// Which record fields form the lane key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneKeyKind {
    /// One lane per station.
    Source,
    /// One lane per event category.
    Category,
    /// One lane per (station, code) pair.
    SourceAndCode,
}

/// How lanes are ordered top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneOrder {
    /// Caller-supplied key order. Keys not listed follow, sorted by key.
    Canonical(Vec<String>),
    /// Busiest lane first; equal counts sorted by key.
    ByCountDesc,
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneGrouping {
    pub key: LaneKeyKind,
    pub order: LaneOrder,
}

const UNCATEGORIZED: &str = "Uncategorized";
const NO_CODE: &str = "?";

impl LaneGrouping {
    /// Event timeline: one lane per station, in line order.
    pub fn event_timeline(canonical: Vec<String>) -> Self {
        Self {
            key: LaneKeyKind::Source,
            order: LaneOrder::Canonical(canonical),
        }
    }

    /// Error timeline: one lane per station and error code, busiest first.
    pub fn error_timeline() -> Self {
        Self {
            key: LaneKeyKind::SourceAndCode,
            order: LaneOrder::ByCountDesc,
        }
    }

    /// Lane key of a record, e.g. `BS`, `Process` or `BS/102`.
    pub fn key_for(&self, record: &TimelineRecord) -> SharedStr {
        match self.key {
            LaneKeyKind::Source => record.source_id.clone(),
            LaneKeyKind::Category => record
                .category
                .clone()
                .unwrap_or_else(|| SharedStr::from(UNCATEGORIZED)),
            LaneKeyKind::SourceAndCode => SharedStr::from(format!(
                "{}/{}",
                record.source_id,
                record.code.as_deref().unwrap_or(NO_CODE)
            )),
        }
    }

    fn title_for(&self, record: &TimelineRecord, catalog: &StationCatalog) -> SharedStr {
        let station = catalog.display_name(&record.source_id);
        match self.key {
            LaneKeyKind::Source => SharedStr::from(station),
            LaneKeyKind::Category => self.key_for(record),
            LaneKeyKind::SourceAndCode => SharedStr::from(format!(
                "{station} · {}",
                record.code.as_deref().unwrap_or(NO_CODE)
            )),
        }
    }
}

impl Default for LaneGrouping {
    fn default() -> Self {
        Self::event_timeline(StationCatalog::manufacturing_line().order())
    }
}

/// Ordered lanes for one filtered record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneLayout {
    lanes: Vec<Lane>,
}

impl LaneLayout {
    /// Group `visible` (positions into `records`, input order) into lanes.
    ///
    /// Deterministic: the same input always yields the same keys in the same
    /// order. Only keys with at least one record produce a lane.
    pub fn build(
        records: &[TimelineRecord],
        visible: &[usize],
        grouping: &LaneGrouping,
        catalog: &StationCatalog,
    ) -> Self {
        let mut groups: BTreeMap<SharedStr, Vec<usize>> = BTreeMap::new();
        for &pos in visible {
            let Some(record) = records.get(pos) else {
                continue;
            };
            groups.entry(grouping.key_for(record)).or_default().push(pos);
        }

        let mut keyed: Vec<(SharedStr, Vec<usize>)> = groups.into_iter().collect();
        match &grouping.order {
            // BTreeMap iteration is already key-sorted.
            LaneOrder::Alphabetical => {}
            LaneOrder::ByCountDesc => {
                keyed.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
            }
            LaneOrder::Canonical(order) => {
                // Composite keys rank by their station prefix.
                let rank = |key: &str| {
                    let head = key.split('/').next().unwrap_or(key);
                    order
                        .iter()
                        .position(|k| k == key)
                        .or_else(|| order.iter().position(|k| k == head))
                        .unwrap_or(order.len())
                };
                keyed.sort_by(|a, b| rank(&a.0).cmp(&rank(&b.0)).then_with(|| a.0.cmp(&b.0)));
            }
        }

        let lanes = keyed
            .into_iter()
            .enumerate()
            .map(|(index, (key, members))| {
                let first = &records[members[0]];
                let mut time_order = members.clone();
                time_order.sort_by_key(|&p| records[p].time_ms);
                let max_duration_ms = members
                    .iter()
                    .map(|&p| records[p].duration_ms())
                    .max()
                    .unwrap_or(0) as f64;
                let color = match grouping.key {
                    LaneKeyKind::Category => None,
                    LaneKeyKind::Source | LaneKeyKind::SourceAndCode => catalog
                        .get(&first.source_id)
                        .and_then(|s| Color::from_hex(&s.color)),
                };
                Lane {
                    title: grouping.title_for(first, catalog),
                    source_id: first.source_id.clone(),
                    key,
                    index,
                    color,
                    records: members,
                    time_order,
                    max_duration_ms,
                }
            })
            .collect();

        Self { lanes }
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    pub fn find(&self, key: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.key == key)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Total number of records across lanes.
    pub fn record_count(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }
}
