//! Property tests for the coordinate mapper, viewport clamping, lane layout
//! and hit-testing.

use std::collections::BTreeSet;

use linescope_core::{
    FilterLayer, FilterSelection, InputEvent, InteractionBounds, InteractionController,
    LaneGrouping, LaneLayout, Mapper, Modifiers, RecordSet, ScaleLimits, Timeline,
    TimelineConfig, TimeRange, ViewportState,
};
use linescope_protocol::{Point, RecordInput, StationCatalog};
use proptest::prelude::*;

const STATIONS: [&str; 6] = ["BS", "BA", "TR", "TO", "LA", "FV"];

fn viewport() -> impl Strategy<Value = ViewportState> {
    (-5_000.0..5_000.0f64, -500.0..0.0f64, 0.1..50.0f64)
        .prop_map(|(x, y, s)| ViewportState::new(x, y, s, &ScaleLimits::default()))
}

fn records() -> impl Strategy<Value = Vec<RecordInput>> {
    prop::collection::vec((0u32..200_000, 0usize..STATIONS.len()), 1..80).prop_map(|items| {
        items
            .into_iter()
            .map(|(t, s)| RecordInput::point(f64::from(t), STATIONS[s], "event"))
            .collect()
    })
}

fn ctrl() -> Modifiers {
    Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    }
}

proptest! {
    #[test]
    fn screen_world_round_trip(
        vp in viewport(),
        min in -1.0e12..1.0e12f64,
        span in 1.0..1.0e9f64,
        frac in 0.0..1.0f64,
        width in 1.0..4_000.0f64,
    ) {
        let config = TimelineConfig::default();
        let mapper = Mapper::new(&vp, TimeRange::new(min, min + span), width, 600.0, &config);
        let t = min + frac * span;
        let back = mapper.to_world_time(mapper.to_screen_x(t));
        // Relative to the magnitudes involved.
        let tol = 1e-9 * (t.abs() + span).max(1.0);
        prop_assert!((back - t).abs() <= tol, "t={t} back={back}");
    }

    #[test]
    fn zoom_keeps_time_under_pointer(
        vp in viewport(),
        px in 0.0..800.0f64,
        delta in -400.0..400.0f64,
    ) {
        let config = TimelineConfig::default();
        let range = TimeRange::new(0.0, 1.0e6);
        let mut controller = InteractionController::new(&config);
        let bounds = InteractionBounds { canvas_width: 800.0, canvas_height: 600.0, content_height: 1_000.0 };
        let mut vp = vp;

        let before = Mapper::new(&vp, range, 800.0, 600.0, &config).to_world_time(px);
        controller.handle(
            &mut vp,
            &InputEvent::Wheel { pos: Point::new(px, 100.0), delta_x: 0.0, delta_y: delta, modifiers: ctrl() },
            &bounds,
        );
        let after = Mapper::new(&vp, range, 800.0, 600.0, &config).to_world_time(px);
        prop_assert!((before - after).abs() < 1e-6 * (before.abs() + 1.0));
    }

    #[test]
    fn scale_is_always_clamped(deltas in prop::collection::vec(-5_000.0..5_000.0f64, 1..60)) {
        let config = TimelineConfig::default();
        let mut controller = InteractionController::new(&config);
        let mut vp = ViewportState::identity(controller.limits());
        let bounds = InteractionBounds { canvas_width: 800.0, canvas_height: 600.0, content_height: 600.0 };
        for d in deltas {
            controller.handle(
                &mut vp,
                &InputEvent::Wheel { pos: Point::new(400.0, 300.0), delta_x: 0.0, delta_y: d, modifiers: ctrl() },
                &bounds,
            );
            prop_assert!(vp.scale() >= config.min_scale && vp.scale() <= config.max_scale);
        }
    }

    #[test]
    fn lane_keys_and_order_are_stable(inputs in records()) {
        let catalog = StationCatalog::manufacturing_line();
        for grouping in [LaneGrouping::event_timeline(catalog.order()), LaneGrouping::error_timeline()] {
            let build = |inputs: &[RecordInput]| {
                let set = RecordSet::from_inputs(inputs);
                let visible = FilterLayer::apply(set.records(), &FilterSelection::all());
                let layout = LaneLayout::build(set.records(), &visible, &grouping, &catalog);
                layout.lanes().iter().map(|l| (l.key.to_string(), l.len())).collect::<Vec<_>>()
            };
            let first = build(&inputs);
            prop_assert_eq!(&first, &build(&inputs));

            // Order depends on the key set and counts only, not on arrival.
            let mut reversed = inputs.clone();
            reversed.reverse();
            prop_assert_eq!(&first, &build(&reversed));

            let keys: BTreeSet<_> = first.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(keys.len(), first.len());
            prop_assert!(first.iter().all(|(_, n)| *n > 0));
        }
    }

    #[test]
    fn hit_test_finds_record_at_its_own_position(
        times in prop::collection::btree_set(0u32..500_000, 1..60),
        zoom_x in 0.0..900.0f64,
        zoom_delta in -2_500.0..2_500.0f64,
        pan in (-3_000.0..3_000.0f64, -300.0..0.0f64),
    ) {
        let inputs: Vec<_> = times
            .iter()
            .enumerate()
            .map(|(i, &t)| RecordInput::point(f64::from(t), STATIONS[i % STATIONS.len()], "event"))
            .collect();
        let catalog = StationCatalog::manufacturing_line();
        let grouping = LaneGrouping::event_timeline(catalog.order());
        let mut timeline = Timeline::new(TimelineConfig::default(), catalog, grouping).unwrap();
        timeline.resize(900.0, 150.0, 1.0);
        timeline.set_records(&inputs);

        timeline.handle(&InputEvent::Wheel {
            pos: Point::new(zoom_x, 100.0),
            delta_x: 0.0,
            delta_y: zoom_delta,
            modifiers: ctrl(),
        });
        timeline.handle(&InputEvent::PointerDown { pos: Point::new(0.0, 0.0) });
        timeline.handle(&InputEvent::PointerMove { pos: Point::new(pan.0, pan.1) });
        timeline.handle(&InputEvent::PointerUp { pos: Point::new(pan.0, pan.1) });

        let axis = timeline.config().axis_height;
        for record in timeline.records().records() {
            let Some(p) = timeline.position_of(record.id) else { continue };
            if p.x < 0.0 || p.x > 900.0 || p.y < axis || p.y > 150.0 {
                continue;
            }
            let hit = timeline.hit_test(p);
            prop_assert_eq!(hit.map(|h| h.record_id), Some(record.id));
        }
    }
}
