use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::TimelineRecord;

/// Set-valued filter over stations, categories and codes.
///
/// `None` means "no restriction" for that dimension. An active set only
/// admits records whose field is present and listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub stations: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
    pub codes: Option<BTreeSet<String>>,
}

impl FilterSelection {
    /// Admit everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_stations<I, S>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stations = Some(stations.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.stations.is_none() && self.categories.is_none() && self.codes.is_none()
    }

    pub fn matches(&self, record: &TimelineRecord) -> bool {
        fn admits(set: Option<&BTreeSet<String>>, value: Option<&str>) -> bool {
            match set {
                None => true,
                Some(set) => value.is_some_and(|v| set.contains(v)),
            }
        }

        admits(self.stations.as_ref(), Some(record.source_id.as_str()))
            && admits(self.categories.as_ref(), record.category.as_deref())
            && admits(self.codes.as_ref(), record.code.as_deref())
    }
}

/// Reduces the full record set to the visible subset.
pub struct FilterLayer;

impl FilterLayer {
    /// Positions (into `records`) of every record the selection admits, in
    /// input order.
    pub fn apply(records: &[TimelineRecord], selection: &FilterSelection) -> Vec<usize> {
        if selection.is_unrestricted() {
            return (0..records.len()).collect();
        }
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| selection.matches(r))
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Distinct filter values present in a record set, for building selector
/// controls outside the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub stations: Vec<FacetCount>,
    pub categories: Vec<FacetCount>,
    pub codes: Vec<FacetCount>,
}

impl Facets {
    pub fn collect(records: &[TimelineRecord]) -> Self {
        let mut stations = BTreeMap::<&str, usize>::new();
        let mut categories = BTreeMap::<&str, usize>::new();
        let mut codes = BTreeMap::<&str, usize>::new();
        for r in records {
            *stations.entry(r.source_id.as_str()).or_default() += 1;
            if let Some(c) = &r.category {
                *categories.entry(c.as_str()).or_default() += 1;
            }
            if let Some(c) = &r.code {
                *codes.entry(c.as_str()).or_default() += 1;
            }
        }
        fn flatten(m: BTreeMap<&str, usize>) -> Vec<FacetCount> {
            m.into_iter()
                .map(|(value, count)| FacetCount {
                    value: value.to_string(),
                    count,
                })
                .collect()
        }

        Self {
            stations: flatten(stations),
            categories: flatten(categories),
            codes: flatten(codes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordSet;
    use linescope_protocol::RecordInput;

    fn sample() -> RecordSet {
        let rec = |t: f64, station: &str, category: Option<&str>, code: Option<&str>| RecordInput {
            category: category.map(Into::into),
            code: code.map(Into::into),
            ..RecordInput::point(t, station, "event")
        };
        RecordSet::from_inputs(&[
            rec(0.0, "BS", Some("Scan"), None),
            rec(1.0, "BA", Some("Process"), Some("102")),
            rec(2.0, "BS", Some("Process"), Some("7")),
            rec(3.0, "FV", None, Some("102")),
        ])
    }

    #[test]
    fn unrestricted_keeps_everything_in_order() {
        let set = sample();
        assert_eq!(FilterLayer::apply(set.records(), &FilterSelection::all()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn station_filter() {
        let set = sample();
        let sel = FilterSelection::all().with_stations(["BS"]);
        assert_eq!(FilterLayer::apply(set.records(), &sel), vec![0, 2]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let set = sample();
        let sel = FilterSelection::all()
            .with_stations(["BS", "BA", "FV"])
            .with_codes(["102"]);
        assert_eq!(FilterLayer::apply(set.records(), &sel), vec![1, 3]);
    }

    #[test]
    fn active_set_excludes_missing_field() {
        let set = sample();
        let sel = FilterSelection::all().with_categories(["Process", "Scan"]);
        assert_eq!(FilterLayer::apply(set.records(), &sel), vec![0, 1, 2]);
    }

    #[test]
    fn empty_set_hides_everything() {
        let set = sample();
        let sel = FilterSelection::all().with_stations(Vec::<String>::new());
        assert!(FilterLayer::apply(set.records(), &sel).is_empty());
    }

    #[test]
    fn facets_count_values() {
        let set = sample();
        let facets = Facets::collect(set.records());
        assert_eq!(
            facets.stations,
            vec![
                FacetCount { value: "BA".into(), count: 1 },
                FacetCount { value: "BS".into(), count: 2 },
                FacetCount { value: "FV".into(), count: 1 },
            ]
        );
        assert_eq!(facets.codes.len(), 2);
        assert_eq!(facets.categories.len(), 2);
    }

    #[test]
    fn selection_json_shape() {
        let sel: FilterSelection =
            serde_json::from_str(r#"{"stations": ["LA", "TO"]}"#).unwrap_or_default();
        assert_eq!(sel, FilterSelection::all().with_stations(["TO", "LA"]));
    }
}
