use std::ops::Range;

use linescope_protocol::{Paint, Point, Rect, SERIES_COUNT, ThemeToken};

use crate::config::TimelineConfig;
use crate::layout::LaneLayout;
use crate::mapper::Mapper;
use crate::model::{Lane, RecordId, TimelineRecord};

/// Everything needed to draw or pick one frame.
///
/// Borrowed from the owning `Timeline`; building one is cheap.
#[derive(Debug, Clone, Copy)]
pub struct TimelineScene<'a> {
    pub config: &'a TimelineConfig,
    pub records: &'a [TimelineRecord],
    pub layout: &'a LaneLayout,
    pub mapper: Mapper,
    pub hovered: Option<RecordId>,
}

/// Screen geometry of one record glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub record_id: RecordId,
    /// Position in the record slice.
    pub position: usize,
    pub lane_index: usize,
    pub center: Point,
    pub radius: f64,
    /// Duration bar, for records with an end time.
    pub bar: Option<Rect>,
    pub color: Paint,
    pub highlighted: bool,
}

impl Glyph {
    /// Radius of the halo drawn behind highlighted records.
    pub fn glow_radius(&self, glow_factor: f64) -> f64 {
        self.radius * glow_factor.max(1.0)
    }

    /// Area covered by everything drawn for this glyph.
    pub fn bounds(&self, glow_factor: f64) -> Rect {
        let r = if self.highlighted {
            self.glow_radius(glow_factor)
        } else {
            self.radius
        };
        let right = self.bar.map_or(self.center.x, |b| b.right());
        Rect::new(
            self.center.x - r,
            self.center.y - r,
            right - self.center.x + 2.0 * r,
            2.0 * r,
        )
    }

    /// Distance from `p` to the glyph's spine: the start point, or the
    /// horizontal segment of the bar.
    pub fn distance_to(&self, p: Point) -> f64 {
        let x0 = self.center.x;
        let x1 = self.bar.map_or(x0, |b| b.right());
        let dx = if p.x < x0 {
            x0 - p.x
        } else if p.x > x1 {
            p.x - x1
        } else {
            0.0
        };
        let dy = p.y - self.center.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl TimelineScene<'_> {
    pub fn lane_paint(&self, lane: &Lane) -> Paint {
        lane.color.map_or_else(
            || Paint::Token(ThemeToken::Series((lane.index % usize::from(SERIES_COUNT)) as u8)),
            Paint::Rgba,
        )
    }

    /// Glyph of the record at `position` drawn in `lane`.
    pub fn glyph(&self, lane: &Lane, position: usize) -> Option<Glyph> {
        let record = self.records.get(position)?;
        let m = &self.mapper;
        let center = m.record_position(lane.index, record.time_ms as f64);
        let radius = m.glyph_radius();
        let bar = record.end_time_ms.filter(|&end| end > record.time_ms).map(|end| {
            let h = (m.lane_height() * self.config.bar_height_fraction).max(1.0);
            let x1 = m.to_screen_x(end as f64);
            Rect::new(center.x, center.y - h / 2.0, (x1 - center.x).max(1.0), h)
        });
        let color = record.color.map_or_else(|| self.lane_paint(lane), Paint::Rgba);
        Some(Glyph {
            record_id: record.id,
            position,
            lane_index: lane.index,
            center,
            radius,
            bar,
            color,
            highlighted: record.is_highlighted,
        })
    }

    /// Lanes whose band intersects the data area below the axis.
    pub fn visible_lanes(&self) -> Range<usize> {
        let m = &self.mapper;
        let n = self.layout.len();
        let data = m.data_rect();
        if data.h <= 0.0 || n == 0 {
            return 0..0;
        }
        let first = m.lane_coordinate(data.y).floor().max(0.0);
        let last = m.lane_coordinate(data.bottom()).floor() + 1.0;
        let to_index = |v: f64| if v.is_finite() { (v as usize).min(n) } else { 0 };
        let (first, last) = (to_index(first), to_index(last.max(0.0)));
        first..last.max(first)
    }

    /// Positions (in time order) of lane records that may cover any instant
    /// in `[t0, t1]`.
    ///
    /// Binary search on the lane's time-sorted index. The lower bound is
    /// widened by the lane's longest duration so long bars starting before
    /// the window are kept.
    pub fn records_in_window<'l>(&self, lane: &'l Lane, t0: f64, t1: f64) -> &'l [usize] {
        let records = self.records;
        let time = |p: &usize| records.get(*p).map_or(0.0, |r| r.time_ms as f64);
        let lo_t = t0 - lane.max_duration_ms;
        let lo = lane.time_order.partition_point(|p| time(p) < lo_t);
        let hi = lane.time_order.partition_point(|p| time(p) <= t1);
        &lane.time_order[lo..hi.max(lo)]
    }

    /// Screen position of a record, if it is laid out.
    pub fn position_of(&self, record_id: RecordId) -> Option<Point> {
        self.layout.lanes().iter().find_map(|lane| {
            lane.records
                .iter()
                .find(|&&p| self.records.get(p).is_some_and(|r| r.id == record_id))
                .and_then(|&p| self.glyph(lane, p))
                .map(|g| g.center)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterLayer, FilterSelection};
    use crate::layout::LaneGrouping;
    use crate::model::RecordSet;
    use crate::time_range::TimeRange;
    use crate::viewport::{ScaleLimits, ViewportState};
    use linescope_protocol::{RecordInput, StationCatalog};

    struct Fixture {
        config: TimelineConfig,
        set: RecordSet,
        layout: LaneLayout,
        range: TimeRange,
    }

    impl Fixture {
        fn new(inputs: &[RecordInput]) -> Self {
            let config = TimelineConfig::default();
            let set = RecordSet::from_inputs(inputs);
            let visible = FilterLayer::apply(set.records(), &FilterSelection::all());
            let layout = LaneLayout::build(
                set.records(),
                &visible,
                &LaneGrouping::default(),
                &StationCatalog::manufacturing_line(),
            );
            let range = TimeRange::from_records(set.records(), 0.0, 0.0);
            Self {
                config,
                set,
                layout,
                range,
            }
        }

        fn scene(&self, vp: ViewportState) -> TimelineScene<'_> {
            TimelineScene {
                config: &self.config,
                records: self.set.records(),
                layout: &self.layout,
                mapper: Mapper::new(&vp, self.range, 1_000.0, 400.0, &self.config),
                hovered: None,
            }
        }
    }

    fn identity() -> ViewportState {
        ViewportState::identity(&ScaleLimits::default())
    }

    #[test]
    fn window_keeps_long_bar_starting_before() {
        let f = Fixture::new(&[
            RecordInput {
                end_timestamp: Some(5_000.0),
                ..RecordInput::point(0.0, "BS", "jam")
            },
            RecordInput::point(4_000.0, "BS", "scan"),
            RecordInput::point(9_000.0, "BS", "scan"),
            RecordInput::point(10_000.0, "BS", "scan"),
        ]);
        let scene = f.scene(identity());
        let lane = &f.layout.lanes()[0];
        assert_eq!(scene.records_in_window(lane, 3_000.0, 4_500.0), &[0, 1]);
        // 9 000 is before the window but within the longest duration of it.
        assert_eq!(scene.records_in_window(lane, 9_500.0, 20_000.0), &[2, 3]);
        assert!(scene.records_in_window(lane, 20_000.0, 30_000.0).is_empty());
    }

    #[test]
    fn bar_distance_is_to_segment() {
        let f = Fixture::new(&[
            RecordInput {
                end_timestamp: Some(10_000.0),
                ..RecordInput::point(0.0, "BS", "jam")
            },
        ]);
        let scene = f.scene(identity());
        let glyph = scene.glyph(&f.layout.lanes()[0], 0).unwrap();
        let bar = glyph.bar.unwrap();
        let mid = Point::new(bar.x + bar.w / 2.0, glyph.center.y + 2.0);
        assert!((glyph.distance_to(mid) - 2.0).abs() < 1e-9);
        let before = Point::new(glyph.center.x - 3.0, glyph.center.y);
        assert!((glyph.distance_to(before) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn lanes_scrolled_above_axis_are_not_visible() {
        let inputs: Vec<_> = ["BS", "BA", "TR", "TO", "LA", "FV"]
            .iter()
            .map(|&s| RecordInput::point(0.0, s, "x"))
            .collect();
        let f = Fixture::new(&inputs);
        let limits = ScaleLimits::default();
        assert_eq!(f.scene(identity()).visible_lanes(), 0..6);
        // Two full pitches scrolled up.
        let vp = ViewportState::new(0.0, -60.0, 1.0, &limits);
        assert_eq!(f.scene(vp).visible_lanes(), 2..6);
    }

    #[test]
    fn unknown_station_lanes_use_series_colors() {
        let f = Fixture::new(&[RecordInput::point(0.0, "QQ", "x")]);
        let scene = f.scene(identity());
        let lane = &f.layout.lanes()[0];
        assert_eq!(scene.lane_paint(lane), Paint::Token(ThemeToken::Series(0)));
    }
}
