use std::collections::BTreeMap;

use linescope_protocol::{Frame, Point, RecordInput, SharedStr, StationCatalog, ThemeToken};
use serde::Serialize;

use crate::config::TimelineConfig;
use crate::error::Result;
use crate::filter::{Facets, FilterLayer, FilterSelection};
use crate::hit_test::{Hit, hit_test};
use crate::interaction::{InputEvent, InteractionBounds, InteractionController, ViewportChange};
use crate::label_column::LabelColumn;
use crate::layout::{LaneGrouping, LaneLayout};
use crate::mapper::Mapper;
use crate::model::{RecordId, RecordSet};
use crate::scene::TimelineScene;
use crate::surface::CanvasSurface;
use crate::time_range::TimeRange;
use crate::viewport::ViewportState;
use crate::views::timeline::render_timeline;

pub type HoverCallback = Box<dyn FnMut(Option<&HoverInfo>)>;
pub type FilterCallback = Box<dyn FnMut(&FilterSelection)>;
pub type LabelOffsetCallback = Box<dyn FnMut(f64)>;

/// Tooltip payload for the hovered record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverInfo {
    pub record_id: RecordId,
    pub time_ms: i64,
    pub end_time_ms: Option<i64>,
    pub source_id: SharedStr,
    pub category: Option<SharedStr>,
    pub code: Option<SharedStr>,
    pub label: SharedStr,
    pub is_highlighted: bool,
    pub payload: BTreeMap<String, String>,
    pub lane_key: SharedStr,
    pub lane_title: SharedStr,
    /// Glyph centre, canvas CSS pixels.
    pub anchor: Point,
    /// Pointer position that produced the hit.
    pub pointer: Point,
}

/// An interactive multi-lane timeline.
///
/// Owns the validated records, filter, lane layout, viewport and canvas
/// surface. All state changes go through `set_*`, `resize` and `handle`;
/// `render` is a pure function of the current state.
pub struct Timeline {
    config: TimelineConfig,
    catalog: StationCatalog,
    grouping: LaneGrouping,
    records: RecordSet,
    selection: FilterSelection,
    layout: LaneLayout,
    range: TimeRange,
    viewport: ViewportState,
    controller: InteractionController,
    surface: CanvasSurface,
    hovered: Option<HoverInfo>,
    last_pointer: Option<Point>,
    dirty: bool,
    on_hover: Option<HoverCallback>,
    on_filter_change: Option<FilterCallback>,
    on_label_offset: Option<LabelOffsetCallback>,
}

impl Timeline {
    pub fn new(config: TimelineConfig, catalog: StationCatalog, grouping: LaneGrouping) -> Result<Self> {
        config.validate()?;
        let controller = InteractionController::new(&config);
        let viewport = ViewportState::identity(controller.limits());
        Ok(Self {
            config,
            catalog,
            grouping,
            records: RecordSet::default(),
            selection: FilterSelection::all(),
            layout: LaneLayout::default(),
            range: TimeRange::EMPTY,
            viewport,
            controller,
            surface: CanvasSurface::default(),
            hovered: None,
            last_pointer: None,
            dirty: true,
            on_hover: None,
            on_filter_change: None,
            on_label_offset: None,
        })
    }

    // --- callbacks ---

    /// Called whenever the hovered record changes, with `None` when the
    /// pointer leaves all records.
    pub fn on_hover(&mut self, f: impl FnMut(Option<&HoverInfo>) + 'static) {
        self.on_hover = Some(Box::new(f));
    }

    pub fn on_filter_change(&mut self, f: impl FnMut(&FilterSelection) + 'static) {
        self.on_filter_change = Some(Box::new(f));
    }

    /// Called with the new `offset_y` on every vertical viewport change, for
    /// hosts that transform the label column themselves.
    pub fn on_label_offset(&mut self, f: impl FnMut(f64) + 'static) {
        self.on_label_offset = Some(Box::new(f));
    }

    // --- state changes ---

    /// Replace the record set. Invalid records are dropped and counted.
    pub fn set_records(&mut self, inputs: &[RecordInput]) {
        self.records = RecordSet::from_inputs(inputs);
        if self.records.dropped() > 0 {
            log::warn!(
                "dropped {} of {} records without a usable timestamp",
                self.records.dropped(),
                inputs.len()
            );
        }
        self.rebuild();
    }

    /// Parse a JSON array of records and replace the record set.
    pub fn set_records_json(&mut self, json: &str) -> Result<()> {
        let inputs: Vec<RecordInput> = serde_json::from_str(json)?;
        self.set_records(&inputs);
        Ok(())
    }

    pub fn set_filter(&mut self, selection: FilterSelection) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        self.rebuild();
        if let Some(cb) = self.on_filter_change.as_mut() {
            cb(&self.selection);
        }
    }

    pub fn set_grouping(&mut self, grouping: LaneGrouping) {
        if grouping == self.grouping {
            return;
        }
        self.grouping = grouping;
        self.rebuild();
    }

    /// Re-measure the canvas. Returns whether anything changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> bool {
        if !self.surface.resize(css_width, css_height, dpr) {
            return false;
        }
        let bounds = self.bounds();
        if self.controller.clamp_vertical(&mut self.viewport, &bounds) {
            self.notify_label_offset();
        }
        self.dirty = true;
        true
    }

    /// Apply one input event.
    pub fn handle(&mut self, event: &InputEvent) -> ViewportChange {
        let bounds = self.bounds();
        let change = self.controller.handle(&mut self.viewport, event, &bounds);
        if change.vertical {
            self.notify_label_offset();
        }
        if change.any() {
            self.dirty = true;
        }

        match *event {
            InputEvent::PointerMove { pos } | InputEvent::Wheel { pos, .. } => {
                self.last_pointer = Some(pos);
                if self.controller.is_dragging() {
                    self.set_hover(None);
                } else {
                    self.update_hover(pos);
                }
            }
            InputEvent::PointerDown { pos } => {
                self.last_pointer = Some(pos);
                self.set_hover(None);
            }
            InputEvent::PointerUp { pos } => {
                self.last_pointer = Some(pos);
                self.update_hover(pos);
            }
            InputEvent::PointerLeave => {
                self.last_pointer = None;
                self.set_hover(None);
            }
            InputEvent::Key(_) => {
                if change.any() {
                    if let Some(pos) = self.last_pointer {
                        self.update_hover(pos);
                    }
                }
            }
        }
        change
    }

    /// Show the whole time range and the first lane.
    pub fn fit_to_view(&mut self) -> ViewportChange {
        let bounds = self.bounds();
        let target = ViewportState::identity(self.controller.limits());
        let change = self.controller.jump_to(&mut self.viewport, target, &bounds);
        if change.vertical {
            self.notify_label_offset();
        }
        if change.any() {
            self.dirty = true;
            self.set_hover(None);
        }
        change
    }

    // --- rendering ---

    /// The display list for the current state.
    pub fn render(&self) -> Frame {
        let commands = if self.surface.is_empty() {
            Vec::new()
        } else {
            render_timeline(&self.scene())
        };
        Frame {
            surface: self.surface.size(),
            commands,
        }
    }

    /// Render only when something changed since the last call; several state
    /// changes between frames coalesce into one redraw.
    pub fn render_if_dirty(&mut self) -> Option<Frame> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.render())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Request a redraw without a state change (theme switch, lost context).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn scene(&self) -> TimelineScene<'_> {
        TimelineScene {
            config: &self.config,
            records: self.records.records(),
            layout: &self.layout,
            mapper: self.mapper(),
            hovered: self.hovered.as_ref().map(|h| h.record_id),
        }
    }

    pub fn mapper(&self) -> Mapper {
        Mapper::new(
            &self.viewport,
            self.range,
            self.surface.css_width(),
            self.surface.css_height(),
            &self.config,
        )
    }

    // --- queries ---

    pub fn hit_test(&self, pointer: Point) -> Option<Hit> {
        hit_test(&self.scene(), pointer)
    }

    pub fn hovered(&self) -> Option<&HoverInfo> {
        self.hovered.as_ref()
    }

    pub fn label_column(&self) -> LabelColumn {
        let scene = self.scene();
        LabelColumn::project(&self.layout, &scene.mapper, |index| {
            self.layout
                .lane(index)
                .map_or(ThemeToken::LabelTextMuted.into(), |lane| scene.lane_paint(lane))
        })
    }

    /// Distinct filter values across all records, filtered or not.
    pub fn facets(&self) -> Facets {
        Facets::collect(self.records.records())
    }

    pub fn dropped_records(&self) -> usize {
        self.records.dropped()
    }

    /// Screen position of a record's glyph, if it is laid out.
    pub fn position_of(&self, record_id: RecordId) -> Option<Point> {
        self.scene().position_of(record_id)
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn layout(&self) -> &LaneLayout {
        &self.layout
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn grouping(&self) -> &LaneGrouping {
        &self.grouping
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    /// Axis plus every lane pitch.
    pub fn content_height(&self) -> f64 {
        self.config.axis_height + self.layout.len() as f64 * self.config.lane_pitch()
    }

    // --- internals ---

    fn bounds(&self) -> InteractionBounds {
        InteractionBounds {
            canvas_width: self.surface.css_width(),
            canvas_height: self.surface.css_height(),
            content_height: self.content_height(),
        }
    }

    fn rebuild(&mut self) {
        let records = self.records.records();
        let visible = FilterLayer::apply(records, &self.selection);
        self.layout = LaneLayout::build(records, &visible, &self.grouping, &self.catalog);
        self.range = TimeRange::from_records(
            visible.iter().filter_map(|&p| records.get(p)),
            self.config.padding_fraction,
            self.config.min_padding_ms,
        );
        log::debug!(
            "layout rebuilt: {} of {} records in {} lanes, range [{}, {}]",
            visible.len(),
            records.len(),
            self.layout.len(),
            self.range.min,
            self.range.max
        );

        let bounds = self.bounds();
        if self.controller.clamp_vertical(&mut self.viewport, &bounds) {
            self.notify_label_offset();
        }
        match self.last_pointer {
            Some(pos) if !self.controller.is_dragging() => self.update_hover(pos),
            _ => self.set_hover(None),
        }
        self.dirty = true;
    }

    fn update_hover(&mut self, pointer: Point) {
        let info = self.hit_test(pointer).and_then(|hit| self.hover_info(&hit, pointer));
        self.set_hover(info);
    }

    fn hover_info(&self, hit: &Hit, pointer: Point) -> Option<HoverInfo> {
        let record = self.records.records().get(hit.record_index)?;
        let lane = self.layout.lane(hit.lane_index)?;
        Some(HoverInfo {
            record_id: record.id,
            time_ms: record.time_ms,
            end_time_ms: record.end_time_ms,
            source_id: record.source_id.clone(),
            category: record.category.clone(),
            code: record.code.clone(),
            label: record.label.clone(),
            is_highlighted: record.is_highlighted,
            payload: record.payload.clone(),
            lane_key: lane.key.clone(),
            lane_title: lane.title.clone(),
            anchor: hit.position,
            pointer,
        })
    }

    /// Store the new hover; fire the callback when the hovered record or
    /// its on-screen anchor changed.
    fn set_hover(&mut self, info: Option<HoverInfo>) {
        let key = |h: &HoverInfo| (h.record_id, h.anchor);
        let changed = self.hovered.as_ref().map(key) != info.as_ref().map(key);
        self.hovered = info;
        if changed {
            self.dirty = true;
            if let Some(cb) = self.on_hover.as_mut() {
                cb(self.hovered.as_ref());
            }
        }
    }

    fn notify_label_offset(&mut self) {
        let offset = self.viewport.offset_y();
        if let Some(cb) = self.on_label_offset.as_mut() {
            cb(offset);
        }
    }
}
