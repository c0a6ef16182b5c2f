use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Geometry, zoom and hit-testing parameters of a timeline.
///
/// All lengths are CSS pixels, all times milliseconds. Every field has a
/// default, so a config JSON only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineConfig {
    pub lane_height: f64,
    /// Gap between consecutive lanes.
    pub lane_margin: f64,
    /// Height of the time axis pinned to the top of the canvas.
    pub axis_height: f64,

    pub min_scale: f64,
    pub max_scale: f64,

    /// Fraction of the data span added on each side of the time range.
    pub padding_fraction: f64,
    /// Lower bound for that padding.
    pub min_padding_ms: f64,
    /// Span used when all plotted records share one timestamp.
    pub degenerate_span_ms: f64,

    /// Glyph radius at scale 1.
    pub glyph_radius: f64,
    pub glyph_radius_min: f64,
    pub glyph_radius_max: f64,
    /// Halo radius relative to the glyph radius for highlighted records.
    pub glow_factor: f64,
    /// Duration bar height relative to the lane height.
    pub bar_height_fraction: f64,

    /// Extra pick distance beyond the glyph radius.
    pub hit_slop: f64,
    pub hit_tolerance_min: f64,
    pub hit_tolerance_max: f64,

    /// Scale factor per wheel delta unit: `exp(-delta_y * zoom_sensitivity)`.
    pub zoom_sensitivity: f64,
    pub key_pan_step: f64,
    pub key_zoom_factor: f64,

    /// Offset applied to axis labels, minutes east of UTC.
    pub utc_offset_minutes: i32,
    pub axis_font_size: f64,
    /// Target spacing between major axis ticks.
    pub major_tick_spacing: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            lane_height: 28.0,
            lane_margin: 2.0,
            axis_height: 24.0,
            min_scale: 0.1,
            max_scale: 50.0,
            padding_fraction: 0.05,
            min_padding_ms: 60_000.0,
            degenerate_span_ms: 3_600_000.0,
            glyph_radius: 4.0,
            glyph_radius_min: 2.0,
            glyph_radius_max: 8.0,
            glow_factor: 2.2,
            bar_height_fraction: 0.45,
            hit_slop: 3.0,
            hit_tolerance_min: 4.0,
            hit_tolerance_max: 12.0,
            zoom_sensitivity: 0.0015,
            key_pan_step: 80.0,
            key_zoom_factor: 1.25,
            utc_offset_minutes: 0,
            axis_font_size: 10.0,
            major_tick_spacing: 100.0,
        }
    }
}

impl TimelineConfig {
    /// Parse a (partial) config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Vertical distance between the tops of consecutive lanes.
    pub fn lane_pitch(&self) -> f64 {
        self.lane_height + self.lane_margin
    }

    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(TimelineError::Config(msg.to_string()))
            }
        }

        let finite = [
            self.lane_height,
            self.lane_margin,
            self.axis_height,
            self.min_scale,
            self.max_scale,
            self.padding_fraction,
            self.min_padding_ms,
            self.degenerate_span_ms,
            self.glyph_radius,
            self.glyph_radius_min,
            self.glyph_radius_max,
            self.glow_factor,
            self.bar_height_fraction,
            self.hit_slop,
            self.hit_tolerance_min,
            self.hit_tolerance_max,
            self.zoom_sensitivity,
            self.key_pan_step,
            self.key_zoom_factor,
            self.axis_font_size,
            self.major_tick_spacing,
        ];
        check(finite.iter().all(|v| v.is_finite()), "all values must be finite")?;

        check(self.lane_height > 0.0, "laneHeight must be positive")?;
        check(self.lane_margin >= 0.0, "laneMargin must not be negative")?;
        check(self.axis_height >= 0.0, "axisHeight must not be negative")?;
        check(self.min_scale > 0.0, "minScale must be positive")?;
        check(
            self.max_scale >= self.min_scale,
            "maxScale must not be below minScale",
        )?;
        check(
            self.padding_fraction >= 0.0 && self.min_padding_ms >= 0.0,
            "padding must not be negative",
        )?;
        check(
            self.degenerate_span_ms > 0.0,
            "degenerateSpanMs must be positive",
        )?;
        check(
            self.glyph_radius_min > 0.0 && self.glyph_radius_min <= self.glyph_radius_max,
            "glyph radius bounds are inverted or empty",
        )?;
        check(
            self.hit_tolerance_min > 0.0 && self.hit_tolerance_min <= self.hit_tolerance_max,
            "hit tolerance bounds are inverted or empty",
        )?;
        check(self.zoom_sensitivity > 0.0, "zoomSensitivity must be positive")?;
        check(self.key_zoom_factor > 1.0, "keyZoomFactor must exceed 1")?;
        check(
            self.major_tick_spacing > 0.0,
            "majorTickSpacing must be positive",
        )?;
        check(
            (-24 * 60..=24 * 60).contains(&self.utc_offset_minutes),
            "utcOffsetMinutes out of range",
        )?;
        Ok(())
    }
}
