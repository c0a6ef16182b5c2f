use serde::{Deserialize, Serialize};

/// Display metadata for one station (record source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInfo {
    pub id: String,
    pub name: String,
    /// CSS hex color used for the station's lanes and glyphs.
    pub color: String,
}

impl StationInfo {
    pub fn new(id: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Ordered station metadata. The order is the physical line order and is
/// used as the canonical lane order of the event timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationCatalog {
    pub stations: Vec<StationInfo>,
}

impl StationCatalog {
    /// The assembly line the dashboard was built for.
    pub fn manufacturing_line() -> Self {
        Self {
            stations: vec![
                StationInfo::new("BS", "Bottom Shell", "#818cf8"),
                StationInfo::new("BA", "Battery", "#34d399"),
                StationInfo::new("TR", "Trans", "#f472b6"),
                StationInfo::new("TO", "Top Shell", "#fbbf24"),
                StationInfo::new("LA", "Laser", "#ef4444"),
                StationInfo::new("FV", "FVT", "#06b6d4"),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&StationInfo> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Station ids in line order.
    pub fn order(&self) -> Vec<String> {
        self.stations.iter().map(|s| s.id.clone()).collect()
    }

    /// Display name for a station id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_order() {
        let catalog = StationCatalog::manufacturing_line();
        assert_eq!(catalog.order(), vec!["BS", "BA", "TR", "TO", "LA", "FV"]);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let catalog = StationCatalog::manufacturing_line();
        assert_eq!(catalog.display_name("LA"), "Laser");
        assert_eq!(catalog.display_name("XX"), "XX");
    }
}
