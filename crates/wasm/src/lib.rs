//! Browser bindings: a `TimelineHandle` owning one timeline and the canvas it
//! paints on. Structured data crosses the boundary as JSON strings.

mod console;
mod painter;

use linescope_core::{
    FilterSelection, InputEvent, Key, LaneGrouping, Modifiers, Timeline, TimelineConfig,
    TimelineError,
};
use linescope_protocol::{Frame, Point, StationCatalog, ThemeMode};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use painter::CanvasPainter;

use painter::js_message;

/// Route `log` output to the browser console at the given level
/// (`"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"` or `"off"`).
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    console::init(console::parse_level(level));
}

#[wasm_bindgen]
pub struct TimelineHandle {
    timeline: Timeline,
    painter: Option<CanvasPainter>,
    theme: ThemeMode,
}

#[wasm_bindgen]
impl TimelineHandle {
    /// Build a timeline over `records_json` and attach it to the canvas with
    /// id `canvas_id`. A missing canvas is not fatal: the handle keeps
    /// accepting input and `draw` logs instead of painting.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        records_json: &str,
        config_json: Option<String>,
    ) -> Result<TimelineHandle, JsError> {
        let config = match config_json.as_deref() {
            Some(json) => TimelineConfig::from_json(json).map_err(to_js)?,
            None => TimelineConfig::default(),
        };
        let catalog = StationCatalog::manufacturing_line();
        let grouping = LaneGrouping::event_timeline(catalog.order());
        let mut timeline = Timeline::new(config, catalog, grouping).map_err(to_js)?;
        timeline.set_records_json(records_json).map_err(to_js)?;

        let painter = match CanvasPainter::attach(canvas_id) {
            Ok(painter) => Some(painter),
            Err(e) => {
                log::error!("{e}");
                None
            }
        };
        Ok(Self {
            timeline,
            painter,
            theme: ThemeMode::default(),
        })
    }

    /// Replace the records and fit the new data to the view.
    pub fn set_records(&mut self, records_json: &str) -> Result<(), JsError> {
        load_records(&mut self.timeline, records_json).map_err(to_js)
    }

    /// `{"stations": [...], "categories": [...], "codes": [...]}`; omitted or
    /// null dimensions are unrestricted.
    pub fn set_filter(&mut self, selection_json: &str) -> Result<(), JsError> {
        let selection: FilterSelection = serde_json::from_str(selection_json).map_err(to_js)?;
        self.timeline.set_filter(selection);
        Ok(())
    }

    /// `"event"` (one lane per station, line order) or `"error"` (one lane
    /// per station and error code, busiest first).
    pub fn set_grouping(&mut self, kind: &str) -> Result<(), JsError> {
        let grouping = grouping_from_kind(kind, self.timeline.catalog()).map_err(to_js)?;
        self.timeline.set_grouping(grouping);
        Ok(())
    }

    pub fn set_theme(&mut self, mode: &str) -> Result<(), JsError> {
        self.theme = theme_from_name(mode).map_err(to_js)?;
        self.timeline.invalidate();
        Ok(())
    }

    /// Returns whether the surface changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> bool {
        self.timeline.resize(css_width, css_height, dpr)
    }

    // --- input; each returns whether the viewport moved ---

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(InputEvent::PointerDown { pos: Point::new(x, y) })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(InputEvent::PointerMove { pos: Point::new(x, y) })
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(InputEvent::PointerUp { pos: Point::new(x, y) })
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.dispatch(InputEvent::PointerLeave)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn wheel(
        &mut self,
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
        shift: bool,
        ctrl: bool,
        meta: bool,
        alt: bool,
    ) -> bool {
        self.dispatch(InputEvent::Wheel {
            pos: Point::new(x, y),
            delta_x,
            delta_y,
            modifiers: Modifiers {
                shift,
                ctrl,
                meta,
                alt,
            },
        })
    }

    /// Handle a DOM `KeyboardEvent.key`. Returns false for unbound keys so
    /// the host can let them propagate.
    pub fn key(&mut self, key: &str) -> bool {
        match Key::from_dom(key) {
            Some(key) => {
                self.dispatch(InputEvent::Key(key));
                true
            }
            None => false,
        }
    }

    pub fn fit_to_view(&mut self) -> bool {
        self.timeline.fit_to_view().any()
    }

    // --- drawing ---

    /// Paint the current state unconditionally.
    pub fn draw(&mut self) {
        let frame = self.timeline.render();
        self.paint(&frame);
    }

    /// Paint only if something changed since the last frame. Meant to be
    /// called from `requestAnimationFrame`.
    pub fn draw_if_dirty(&mut self) -> bool {
        match self.timeline.render_if_dirty() {
            Some(frame) => {
                self.paint(&frame);
                true
            }
            None => false,
        }
    }

    /// The current frame as a JSON display list, for hosts with their own
    /// backend.
    pub fn render_commands(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.timeline.render()).map_err(to_js)
    }

    pub fn label_column(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.timeline.label_column()).map_err(to_js)
    }

    pub fn facets(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.timeline.facets()).map_err(to_js)
    }

    pub fn hovered(&self) -> Result<Option<String>, JsError> {
        self.timeline
            .hovered()
            .map(serde_json::to_string)
            .transpose()
            .map_err(to_js)
    }

    pub fn dropped_records(&self) -> usize {
        self.timeline.dropped_records()
    }

    pub fn has_canvas(&self) -> bool {
        self.painter.is_some()
    }

    // --- callbacks ---

    /// `f(hover | null)` whenever the hovered record changes.
    pub fn on_hover(&mut self, f: js_sys::Function) {
        self.timeline.on_hover(move |info| {
            let arg = match info {
                Some(info) => to_js_value(info),
                None => JsValue::NULL,
            };
            call(&f, &arg);
        });
    }

    /// `f(selection)` after a filter change that altered the selection.
    pub fn on_filter_change(&mut self, f: js_sys::Function) {
        self.timeline.on_filter_change(move |selection| {
            call(&f, &to_js_value(selection));
        });
    }

    /// `f(translateY)` on every vertical viewport change, for label columns
    /// rendered as DOM outside the canvas.
    pub fn on_label_offset(&mut self, f: js_sys::Function) {
        self.timeline.on_label_offset(move |offset| {
            call(&f, &JsValue::from_f64(offset));
        });
    }
}

impl TimelineHandle {
    fn dispatch(&mut self, event: InputEvent) -> bool {
        self.timeline.handle(&event).any()
    }

    fn paint(&self, frame: &Frame) {
        let Some(painter) = &self.painter else {
            log::error!("draw skipped: no canvas attached");
            return;
        };
        if let Err(e) = painter.paint(frame, self.theme) {
            log::error!("draw failed: {}", js_message(&e));
        }
    }
}

/// A rejected batch leaves the previous records and viewport in place.
fn load_records(timeline: &mut Timeline, records_json: &str) -> Result<(), TimelineError> {
    timeline.set_records_json(records_json)?;
    timeline.fit_to_view();
    Ok(())
}

fn grouping_from_kind(kind: &str, catalog: &StationCatalog) -> Result<LaneGrouping, TimelineError> {
    match kind {
        "event" => Ok(LaneGrouping::event_timeline(catalog.order())),
        "error" => Ok(LaneGrouping::error_timeline()),
        other => Err(TimelineError::Config(format!("unknown grouping {other:?}"))),
    }
}

fn theme_from_name(name: &str) -> Result<ThemeMode, TimelineError> {
    match name {
        "dark" => Ok(ThemeMode::Dark),
        "light" => Ok(ThemeMode::Light),
        other => Err(TimelineError::Config(format!("unknown theme {other:?}"))),
    }
}

fn to_js(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn to_js_value(value: &impl Serialize) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(e) => {
            log::error!("callback payload: {e}");
            JsValue::NULL
        }
    }
}

fn call(f: &js_sys::Function, arg: &JsValue) {
    if let Err(e) = f.call1(&JsValue::NULL, arg) {
        log::error!("callback threw: {}", js_message(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linescope_core::LaneKeyKind;

    #[test]
    fn grouping_kinds() {
        let catalog = StationCatalog::manufacturing_line();
        let event = grouping_from_kind("event", &catalog).unwrap();
        assert_eq!(event.key, LaneKeyKind::Source);
        let error = grouping_from_kind("error", &catalog).unwrap();
        assert_eq!(error.key, LaneKeyKind::SourceAndCode);
        assert!(matches!(
            grouping_from_kind("swimlane", &catalog),
            Err(TimelineError::Config(_))
        ));
    }

    #[test]
    fn loading_records_fits_the_view() {
        let catalog = StationCatalog::manufacturing_line();
        let grouping = LaneGrouping::event_timeline(catalog.order());
        let mut timeline = Timeline::new(TimelineConfig::default(), catalog, grouping).unwrap();
        timeline.resize(800.0, 300.0, 1.0);
        load_records(&mut timeline, r#"[{"timestamp": 1000, "sourceId": "BS"}]"#).unwrap();
        timeline.handle(&InputEvent::Key(Key::ZoomIn));
        timeline.handle(&InputEvent::Key(Key::PanRight));
        assert!(timeline.viewport().scale() > 1.0);

        load_records(&mut timeline, r#"[{"timestamp": 90000, "sourceId": "TR"}]"#).unwrap();
        assert!((timeline.viewport().scale() - 1.0).abs() < f64::EPSILON);
        assert!(timeline.viewport().offset_x().abs() < f64::EPSILON);

        // A malformed batch keeps the current view.
        timeline.handle(&InputEvent::Key(Key::ZoomIn));
        assert!(load_records(&mut timeline, "not json").is_err());
        assert!(timeline.viewport().scale() > 1.0);
    }

    #[test]
    fn theme_names() {
        assert_eq!(theme_from_name("light").unwrap(), ThemeMode::Light);
        assert_eq!(theme_from_name("dark").unwrap(), ThemeMode::Dark);
        assert!(theme_from_name("sepia").is_err());
    }

    #[test]
    fn filter_json_accepts_partial_selection() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"categories": ["Error"]}"#).unwrap();
        assert_eq!(selection, FilterSelection::all().with_categories(["Error"]));
    }
}
