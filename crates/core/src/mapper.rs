use linescope_protocol::{Point, Rect};

use crate::config::TimelineConfig;
use crate::time_range::TimeRange;
use crate::viewport::ViewportState;

/// Converts between world time and canvas (CSS pixel) coordinates.
///
/// The renderer and the hit tester both build their geometry from the same
/// `Mapper` value, so a glyph is picked exactly where it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapper {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    range_min: f64,
    span: f64,
    width: f64,
    height: f64,
    lane_height: f64,
    lane_pitch: f64,
    axis_height: f64,
    glyph_radius: f64,
    hit_tolerance: f64,
}

impl Mapper {
    pub fn new(
        viewport: &ViewportState,
        range: TimeRange,
        canvas_width: f64,
        canvas_height: f64,
        config: &TimelineConfig,
    ) -> Self {
        let range = range.effective(config.degenerate_span_ms);
        let scale = viewport.scale();
        let glyph_radius = (config.glyph_radius * scale.sqrt())
            .clamp(config.glyph_radius_min, config.glyph_radius_max);
        let hit_tolerance = (glyph_radius + config.hit_slop)
            .clamp(config.hit_tolerance_min, config.hit_tolerance_max);
        Self {
            offset_x: viewport.offset_x(),
            offset_y: viewport.offset_y(),
            scale,
            range_min: range.min,
            span: range.span(),
            // A collapsed canvas still needs an invertible mapping.
            width: if canvas_width > 0.0 { canvas_width } else { 1.0 },
            height: canvas_height.max(0.0),
            lane_height: config.lane_height,
            lane_pitch: config.lane_pitch(),
            axis_height: config.axis_height,
            glyph_radius,
            hit_tolerance,
        }
    }

    /// `offset_x + ((t - min) / span) * width * scale`
    pub fn to_screen_x(&self, time_ms: f64) -> f64 {
        self.offset_x + (time_ms - self.range_min) / self.span * self.width * self.scale
    }

    /// Exact inverse of [`Mapper::to_screen_x`].
    pub fn to_world_time(&self, screen_x: f64) -> f64 {
        self.range_min + (screen_x - self.offset_x) / (self.width * self.scale) * self.span
    }

    /// Screen pixels per millisecond at the current zoom.
    pub fn pixels_per_ms(&self) -> f64 {
        self.width * self.scale / self.span
    }

    /// Top edge of lane `index`: `offset_y + index * pitch + axis_height`.
    pub fn lane_top(&self, index: usize) -> f64 {
        self.offset_y + index as f64 * self.lane_pitch + self.axis_height
    }

    pub fn lane_center_y(&self, index: usize) -> f64 {
        self.lane_top(index) + self.lane_height / 2.0
    }

    /// Lane band (without the trailing margin).
    pub fn lane_rect(&self, index: usize) -> Rect {
        Rect::new(0.0, self.lane_top(index), self.width, self.lane_height)
    }

    /// Fractional lane coordinate of a screen y; `floor` gives the lane whose
    /// pitch slot contains `y`.
    pub fn lane_coordinate(&self, y: f64) -> f64 {
        (y - self.offset_y - self.axis_height) / self.lane_pitch
    }

    /// Glyph centre of a record starting at `time_ms` in lane `index`.
    pub fn record_position(&self, index: usize, time_ms: f64) -> Point {
        Point::new(self.to_screen_x(time_ms), self.lane_center_y(index))
    }

    pub fn glyph_radius(&self) -> f64 {
        self.glyph_radius
    }

    pub fn hit_tolerance(&self) -> f64 {
        self.hit_tolerance
    }

    pub fn lane_height(&self) -> f64 {
        self.lane_height
    }

    pub fn lane_pitch(&self) -> f64 {
        self.lane_pitch
    }

    pub fn axis_height(&self) -> f64 {
        self.axis_height
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Area below the axis where lanes are visible.
    pub fn data_rect(&self) -> Rect {
        let top = self.axis_height.min(self.height);
        Rect::new(0.0, top, self.width, self.height - top)
    }

    /// World-time window currently visible across the canvas width.
    pub fn visible_time(&self) -> TimeRange {
        TimeRange::new(self.to_world_time(0.0), self.to_world_time(self.width))
    }
}
