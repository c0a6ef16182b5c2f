use std::collections::BTreeSet;

use anyhow::Context as _;
use eframe::egui;
use linescope_core::{
    FacetCount, Facets, FilterSelection, HoverInfo, InputEvent, LaneGrouping, LaneKeyKind,
    Timeline, TimelineConfig,
};
use linescope_protocol::{Frame, Point, StationCatalog, ThemeMode, ThemeToken};

use crate::input;
use crate::renderer;
use crate::theme;

const LABEL_COLUMN_WIDTH: f32 = 160.0;

/// Format a span in ms to a human-readable string.
fn format_span(ms: f64) -> String {
    if ms < 1_000.0 {
        format!("{ms:.0}ms")
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else if ms < 3_600_000.0 {
        format!("{:.1}min", ms / 60_000.0)
    } else if ms < 86_400_000.0 {
        format!("{:.1}h", ms / 3_600_000.0)
    } else {
        format!("{:.1}d", ms / 86_400_000.0)
    }
}

/// Toggle one facet value in a filter dimension. A dimension with every
/// value checked collapses back to "unrestricted".
fn toggle_facet(
    current: Option<&BTreeSet<String>>,
    all: &[FacetCount],
    value: &str,
    on: bool,
) -> Option<BTreeSet<String>> {
    let mut set = current
        .cloned()
        .unwrap_or_else(|| all.iter().map(|f| f.value.clone()).collect());
    if on {
        set.insert(value.to_string());
    } else {
        set.remove(value);
    }
    if all.iter().all(|f| set.contains(&f.value)) {
        None
    } else {
        Some(set)
    }
}

/// A filterable dimension shown as a checkbox section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Station,
    Category,
    Code,
}

impl Dimension {
    const ALL: [Dimension; 3] = [Dimension::Station, Dimension::Category, Dimension::Code];

    fn heading(self) -> &'static str {
        match self {
            Dimension::Station => "Stations",
            Dimension::Category => "Categories",
            Dimension::Code => "Codes",
        }
    }

    fn facets(self, facets: &Facets) -> &[FacetCount] {
        match self {
            Dimension::Station => &facets.stations,
            Dimension::Category => &facets.categories,
            Dimension::Code => &facets.codes,
        }
    }

    fn selection(self, selection: &mut FilterSelection) -> &mut Option<BTreeSet<String>> {
        match self {
            Dimension::Station => &mut selection.stations,
            Dimension::Category => &mut selection.categories,
            Dimension::Code => &mut selection.codes,
        }
    }
}

fn is_checked(set: Option<&BTreeSet<String>>, value: &str) -> bool {
    set.is_none_or(|s| s.contains(value))
}

fn read_records(path: &std::path::Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Main application state.
pub struct LinescopeApp {
    timeline: Timeline,
    theme_mode: ThemeMode,
    /// Last rendered frame, refreshed only when the timeline is dirty.
    frame: Option<Frame>,
    /// Pointer position the timeline last saw, canvas-local.
    pointer: Option<Point>,
    source_name: Option<String>,
    error: Option<String>,
}

impl LinescopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let theme_mode = ThemeMode::Dark;
        cc.egui_ctx.set_visuals(theme::visuals(theme_mode));

        let catalog = StationCatalog::manufacturing_line();
        let grouping = LaneGrouping::event_timeline(catalog.order());
        let timeline = Timeline::new(TimelineConfig::default(), catalog, grouping)?;
        Ok(Self {
            timeline,
            theme_mode,
            frame: None,
            pointer: None,
            source_name: None,
            error: None,
        })
    }

    pub fn open_path(&mut self, path: &std::path::Path) {
        let loaded = read_records(path).and_then(|json| {
            self.timeline
                .set_records_json(&json)
                .with_context(|| format!("parsing {}", path.display()))
        });
        match loaded {
            Ok(()) => self.loaded(path.display().to_string()),
            Err(e) => self.fail(e),
        }
    }

    fn open_bytes(&mut self, name: String, bytes: &[u8]) {
        let loaded = std::str::from_utf8(bytes)
            .context("records file is not UTF-8")
            .and_then(|json| {
                self.timeline
                    .set_records_json(json)
                    .with_context(|| format!("parsing {name}"))
            });
        match loaded {
            Ok(()) => self.loaded(name),
            Err(e) => self.fail(e),
        }
    }

    fn loaded(&mut self, name: String) {
        log::info!(
            "loaded {name}: {} records, {} dropped",
            self.timeline.records().len(),
            self.timeline.dropped_records()
        );
        self.source_name = Some(name);
        self.error = None;
        self.timeline.fit_to_view();
    }

    fn fail(&mut self, e: anyhow::Error) {
        log::error!("{e:#}");
        self.error = Some(format!("{e:#}"));
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("linescope");
            ui.separator();

            #[cfg(not(target_arch = "wasm32"))]
            if ui.button("Open…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Records", &["json"])
                    .pick_file()
                {
                    self.open_path(&path);
                }
            }

            ui.separator();
            let current = self.timeline.grouping().key;
            if ui
                .selectable_label(current == LaneKeyKind::Source, "Events")
                .clicked()
            {
                let order = self.timeline.catalog().order();
                self.timeline.set_grouping(LaneGrouping::event_timeline(order));
            }
            if ui
                .selectable_label(current == LaneKeyKind::SourceAndCode, "Errors")
                .clicked()
            {
                self.timeline.set_grouping(LaneGrouping::error_timeline());
            }

            ui.separator();
            if ui.button("Fit").clicked() {
                self.timeline.fit_to_view();
            }

            let theme_label = match self.theme_mode {
                ThemeMode::Dark => "Dark",
                ThemeMode::Light => "Light",
            };
            if ui.button(theme_label).clicked() {
                self.theme_mode = self.theme_mode.toggled();
                ctx.set_visuals(theme::visuals(self.theme_mode));
                self.timeline.invalidate();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{:.0}%", self.timeline.viewport().scale() * 100.0));
            });
        });
    }

    fn filters(&mut self, ui: &mut egui::Ui) {
        let facets = self.timeline.facets();
        let mut next = self.timeline.selection().clone();
        let mut changed = false;

        let mut first = true;
        for dim in Dimension::ALL {
            let all = dim.facets(&facets);
            if all.is_empty() {
                continue;
            }
            if !std::mem::take(&mut first) {
                ui.separator();
            }
            ui.heading(dim.heading());
            for facet in all {
                let name = match dim {
                    Dimension::Station => self.timeline.catalog().display_name(&facet.value).to_string(),
                    Dimension::Category | Dimension::Code => facet.value.clone(),
                };
                let current = dim.selection(&mut next);
                let mut on = is_checked(current.as_ref(), &facet.value);
                if ui
                    .checkbox(&mut on, format!("{name} ({})", facet.count))
                    .changed()
                {
                    *current = toggle_facet(current.as_ref(), all, &facet.value, on);
                    changed = true;
                }
            }
        }

        if changed {
            self.timeline.set_filter(next);
        }
    }

    fn status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::RED, err);
                return;
            }
            let Some(name) = &self.source_name else {
                ui.label("No records loaded. Click Open or drop a JSON file.");
                return;
            };
            let mapper = self.timeline.mapper();
            let visible = mapper.to_world_time(self.timeline.surface().css_width())
                - mapper.to_world_time(0.0);
            ui.label(format!(
                "{name} | Records: {} | Dropped: {} | Lanes: {} | Viewing: {}",
                self.timeline.layout().record_count(),
                self.timeline.dropped_records(),
                self.timeline.layout().len(),
                format_span(visible.max(0.0)),
            ));
        });
    }

    /// Draw the lane titles beside the canvas, positioned from the timeline's
    /// label projection rather than any scroll state of their own.
    fn label_column(&self, painter: &mut egui::Painter, strip: egui::Rect) {
        let column = self.timeline.label_column();
        let mode = self.theme_mode;
        painter.rect_filled(
            strip,
            egui::CornerRadius::ZERO,
            theme::resolve(ThemeToken::LabelColumnBackground, mode),
        );

        let header = egui::Rect::from_min_size(
            strip.min,
            egui::vec2(strip.width(), column.header_height as f32),
        );
        painter.text(
            egui::pos2(header.left() + 8.0, header.center().y),
            egui::Align2::LEFT_CENTER,
            "Lane",
            egui::FontId::proportional(11.0),
            theme::resolve(ThemeToken::LabelTextMuted, mode),
        );

        let rows_area = egui::Rect::from_min_max(egui::pos2(strip.left(), header.bottom()), strip.max);
        let saved = painter.clip_rect();
        painter.set_clip_rect(saved.intersect(rows_area));
        for row in &column.rows {
            let top = strip.top() + (row.top + column.translate_y) as f32;
            let mid = top + row.height as f32 / 2.0;
            if top > strip.bottom() || top + (row.height as f32) < rows_area.top() {
                continue;
            }
            painter.circle_filled(
                egui::pos2(strip.left() + 12.0, mid),
                4.0,
                theme::resolve(row.color, mode),
            );
            painter.text(
                egui::pos2(strip.left() + 22.0, mid),
                egui::Align2::LEFT_CENTER,
                row.title.as_ref(),
                egui::FontId::proportional(12.0),
                theme::resolve(ThemeToken::LabelText, mode),
            );
            painter.text(
                egui::pos2(strip.right() - 8.0, mid),
                egui::Align2::RIGHT_CENTER,
                row.count.to_string(),
                egui::FontId::proportional(10.0),
                theme::resolve(ThemeToken::LabelTextMuted, mode),
            );
        }
        painter.set_clip_rect(saved);
    }

    /// Feed this frame's pointer, wheel and key input to the timeline.
    fn forward_input(&mut self, ui: &egui::Ui, response: &egui::Response, canvas: egui::Rect) {
        let local = |p: egui::Pos2| Point::new(f64::from(p.x - canvas.left()), f64::from(p.y - canvas.top()));
        let mut events = Vec::new();

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                events.push(InputEvent::PointerDown { pos: local(origin) });
            }
        }

        let dragging = response.dragged_by(egui::PointerButton::Primary);
        let pos = if dragging {
            ui.input(|i| i.pointer.interact_pos())
        } else {
            response.hover_pos()
        };
        match pos.map(local) {
            Some(p) if self.pointer != Some(p) => events.push(InputEvent::PointerMove { pos: p }),
            None if self.pointer.is_some() => events.push(InputEvent::PointerLeave),
            _ => {}
        }
        let pos = pos.map(local);

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if let Some(p) = pos.or(self.pointer) {
                events.push(InputEvent::PointerUp { pos: p });
            }
        }

        if let Some(p) = pos.filter(|_| response.hovered()) {
            let sensitivity = self.timeline.config().zoom_sensitivity;
            let wheel = ui.input(|i| {
                input::wheel_event(p, i.raw_scroll_delta, i.zoom_delta(), i.modifiers, sensitivity)
            });
            events.extend(wheel);

            ui.input(|i| {
                for event in &i.events {
                    if let egui::Event::Key {
                        key, pressed: true, ..
                    } = event
                    {
                        if let Some(key) = input::map_key(*key) {
                            events.push(InputEvent::Key(key));
                        }
                    }
                }
            });
        }

        self.pointer = pos;
        for event in &events {
            self.timeline.handle(event);
        }
    }

    fn tooltip(hover: &HoverInfo, ui: &mut egui::Ui) {
        ui.strong(hover.label.as_ref());
        ui.label(format!("Lane: {}", hover.lane_title));
        ui.label(format!("Station: {}", hover.source_id));
        if let Some(category) = &hover.category {
            ui.label(format!("Category: {category}"));
        }
        if let Some(code) = &hover.code {
            ui.label(format!("Code: {code}"));
        }
        if let Some(end) = hover.end_time_ms {
            ui.label(format!("Duration: {}", format_span((end - hover.time_ms) as f64)));
        }
        for (key, value) in &hover.payload {
            ui.label(format!("{key}: {value}"));
        }
    }

    fn take_dropped_file(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };
        if let Some(bytes) = &file.bytes {
            self.open_bytes(file.name.clone(), bytes);
        } else if let Some(path) = &file.path {
            self.open_path(path);
        }
    }
}

impl eframe::App for LinescopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.take_dropped_file(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ctx, ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status(ui));
        egui::SidePanel::right("filters")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| self.filters(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_rect_before_wrap();
                let (strip, canvas) = available.split_left_right_at_x(available.left() + LABEL_COLUMN_WIDTH);

                self.timeline.resize(
                    f64::from(canvas.width()),
                    f64::from(canvas.height()),
                    f64::from(ctx.pixels_per_point()),
                );

                let response = ui.allocate_rect(canvas, egui::Sense::click_and_drag());
                self.forward_input(ui, &response, canvas);

                if let Some(frame) = self.timeline.render_if_dirty() {
                    self.frame = Some(frame);
                }

                let mut painter = ui.painter_at(available);
                self.label_column(&mut painter, strip);
                if let Some(frame) = &self.frame {
                    let mut canvas_painter = painter.with_clip_rect(canvas);
                    renderer::render_frame(&mut canvas_painter, frame, canvas.min, self.theme_mode);
                }

                if let Some(hover) = self.timeline.hovered() {
                    response.on_hover_ui_at_pointer(|ui| Self::tooltip(hover, ui));
                }
            });
    }
}
