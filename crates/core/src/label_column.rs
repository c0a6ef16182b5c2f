use linescope_protocol::{Paint, SharedStr};
use serde::{Deserialize, Serialize};

use crate::layout::LaneLayout;
use crate::mapper::Mapper;

/// One row of the label column, aligned with lane `index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRow {
    pub key: SharedStr,
    pub title: SharedStr,
    pub count: usize,
    pub index: usize,
    /// Top edge in unscrolled column coordinates. On screen the row sits at
    /// `top + translate_y`, which equals the lane top on the canvas.
    pub top: f64,
    pub height: f64,
    pub color: Paint,
}

/// The label column as a read-only projection of the canvas viewport.
///
/// Hosts apply `translate_y` as a vertical transform on the whole column and
/// place rows at `top`; neither is ever derived from the column's own scroll
/// position, so rows cannot drift from their lanes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelColumn {
    pub translate_y: f64,
    /// Header spacer matching the time axis.
    pub header_height: f64,
    pub rows: Vec<LabelRow>,
}

impl LabelColumn {
    pub fn project(layout: &LaneLayout, mapper: &Mapper, lane_paint: impl Fn(usize) -> Paint) -> Self {
        let axis = mapper.axis_height();
        let pitch = mapper.lane_pitch();
        // lane_top(i) = offset_y + i * pitch + axis
        let translate_y = mapper.lane_top(0) - axis;
        let rows = layout
            .lanes()
            .iter()
            .map(|lane| LabelRow {
                key: lane.key.clone(),
                title: lane.title.clone(),
                count: lane.len(),
                index: lane.index,
                top: axis + lane.index as f64 * pitch,
                height: mapper.lane_height(),
                color: lane_paint(lane.index),
            })
            .collect();
        Self {
            translate_y,
            header_height: axis,
            rows,
        }
    }

    /// Screen top of row `index`.
    pub fn row_screen_top(&self, index: usize) -> Option<f64> {
        self.rows.get(index).map(|r| r.top + self.translate_y)
    }
}
