use linescope_protocol::Point;
use serde::{Deserialize, Serialize};

use crate::model::RecordId;
use crate::scene::TimelineScene;

/// The record under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub record_id: RecordId,
    /// Position in the record slice.
    pub record_index: usize,
    pub lane_index: usize,
    /// Screen distance from the pointer to the glyph.
    pub distance: f64,
    /// Glyph centre on screen.
    pub position: Point,
}

/// Nearest record within the hit tolerance of `pointer`.
///
/// Geometry comes from [`TimelineScene::glyph`], the same source the renderer
/// draws from. Only lanes whose centre line is within tolerance of the pointer
/// and only records in the pointer's time window are examined. Exact distance
/// ties go to the lower lane, then to the earlier record. The axis strip
/// occludes the lanes, so pointers over it never hit.
pub fn hit_test(scene: &TimelineScene<'_>, pointer: Point) -> Option<Hit> {
    let m = &scene.mapper;
    if !m.canvas_rect().contains(pointer) || pointer.y < m.axis_height() {
        return None;
    }
    let n = scene.layout.len();
    if n == 0 {
        return None;
    }

    let tol = m.hit_tolerance();
    let first = m.lane_coordinate(pointer.y - tol).floor().max(0.0);
    let last = m.lane_coordinate(pointer.y + tol).floor();
    if last < 0.0 || first >= n as f64 {
        return None;
    }
    let (first, last) = (first as usize, (last as usize).min(n - 1));

    let t0 = m.to_world_time(pointer.x - tol);
    let t1 = m.to_world_time(pointer.x + tol);

    let mut best: Option<Hit> = None;
    for lane in &scene.layout.lanes()[first..=last] {
        for &position in scene.records_in_window(lane, t0, t1) {
            let Some(glyph) = scene.glyph(lane, position) else {
                continue;
            };
            let distance = glyph.distance_to(pointer);
            if distance > tol {
                continue;
            }
            let better = best.is_none_or(|b| {
                distance < b.distance
                    || (distance == b.distance
                        && (lane.index, position) < (b.lane_index, b.record_index))
            });
            if better {
                best = Some(Hit {
                    record_id: glyph.record_id,
                    record_index: position,
                    lane_index: lane.index,
                    distance,
                    position: glyph.center,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::filter::{FilterLayer, FilterSelection};
    use crate::layout::{LaneGrouping, LaneLayout};
    use crate::mapper::Mapper;
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
            Self::with_config(inputs, TimelineConfig::default())
        }

        fn with_config(inputs: &[RecordInput], config: TimelineConfig) -> Self {
            let set = RecordSet::from_inputs(inputs);
            let visible = FilterLayer::apply(set.records(), &FilterSelection::all());
            let layout = LaneLayout::build(
                set.records(),
                &visible,
                &LaneGrouping::default(),
                &StationCatalog::manufacturing_line(),
            );
            let range = TimeRange::new(0.0, 10_000.0);
            Self {
                config,
                set,
                layout,
                range,
            }
        }

        fn scene(&self) -> TimelineScene<'_> {
            let vp = ViewportState::identity(&ScaleLimits::default());
            TimelineScene {
                config: &self.config,
                records: self.set.records(),
                layout: &self.layout,
                mapper: Mapper::new(&vp, self.range, 1_000.0, 400.0, &self.config),
                hovered: None,
            }
        }
    }

    #[test]
    fn hits_glyph_centre() {
        let f = Fixture::new(&[
            RecordInput::point(1_000.0, "BS", "a"),
            RecordInput::point(5_000.0, "BA", "b"),
        ]);
        let scene = f.scene();
        let p = scene.position_of(1).unwrap();
        let hit = hit_test(&scene, p).unwrap();
        assert_eq!(hit.record_id, 1);
        assert_eq!(hit.lane_index, 1);
        assert!(hit.distance.abs() < 1e-9);
    }

    #[test]
    fn nearest_wins() {
        // 1 ms = 0.1 px: records 40 ms apart are 4 px apart.
        let f = Fixture::new(&[
            RecordInput::point(1_000.0, "BS", "a"),
            RecordInput::point(1_040.0, "BS", "b"),
        ]);
        let scene = f.scene();
        let a = scene.position_of(0).unwrap();
        let near_b = Point::new(a.x + 3.0, a.y);
        assert_eq!(hit_test(&scene, near_b).map(|h| h.record_id), Some(1));
    }

    #[test]
    fn exact_tie_goes_to_earlier_record() {
        let f = Fixture::new(&[
            RecordInput::point(1_000.0, "BS", "a"),
            RecordInput::point(1_000.0, "BS", "b"),
        ]);
        let scene = f.scene();
        let p = scene.position_of(1).unwrap();
        assert_eq!(hit_test(&scene, p).map(|h| h.record_id), Some(0));
    }

    #[test]
    fn exact_tie_across_lanes_goes_to_lower_lane() {
        // 8 px lanes with no gap: centre lines sit 8 px apart, so a pointer
        // midway is 4 px from both, within the minimum tolerance.
        let config = TimelineConfig {
            lane_height: 8.0,
            lane_margin: 0.0,
            ..TimelineConfig::default()
        };
        // The BA record arrives first so arrival order cannot decide.
        let f = Fixture::with_config(
            &[
                RecordInput::point(3_000.0, "BA", "second lane"),
                RecordInput::point(3_000.0, "BS", "first lane"),
            ],
            config,
        );
        let scene = f.scene();
        let upper = scene.position_of(1).unwrap();
        let lower = scene.position_of(0).unwrap();
        assert!(upper.y < lower.y);
        let mid = Point::new(upper.x, (upper.y + lower.y) / 2.0);
        let hit = hit_test(&scene, mid).unwrap();
        assert_eq!(hit.lane_index, 0);
        assert_eq!(hit.record_id, 1);
        assert!((hit.distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn outside_tolerance_misses() {
        let f = Fixture::new(&[RecordInput::point(1_000.0, "BS", "a")]);
        let scene = f.scene();
        let p = scene.position_of(0).unwrap();
        let tol = scene.mapper.hit_tolerance();
        assert!(hit_test(&scene, Point::new(p.x + tol + 0.5, p.y)).is_none());
        assert!(hit_test(&scene, Point::new(p.x, p.y + tol - 0.5)).is_some());
    }

    #[test]
    fn bar_is_hit_along_its_length() {
        let f = Fixture::new(&[RecordInput {
            end_timestamp: Some(6_000.0),
            ..RecordInput::point(2_000.0, "TR", "jam")
        }]);
        let scene = f.scene();
        let start = scene.position_of(0).unwrap();
        // Halfway along the bar, 200 px right of the start.
        let hit = hit_test(&scene, Point::new(start.x + 200.0, start.y + 1.0)).unwrap();
        assert_eq!(hit.record_id, 0);
        assert!((hit.distance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn axis_strip_and_outside_canvas_never_hit() {
        let f = Fixture::new(&[RecordInput::point(1_000.0, "BS", "a")]);
        let scene = f.scene();
        let p = scene.position_of(0).unwrap();
        assert!(hit_test(&scene, Point::new(p.x, 10.0)).is_none());
        assert!(hit_test(&scene, Point::new(-1.0, p.y)).is_none());
        assert!(hit_test(&scene, Point::new(f64::NAN, p.y)).is_none());
    }
}
