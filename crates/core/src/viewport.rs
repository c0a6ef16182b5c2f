use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;

/// Allowed zoom range. Always `0 < min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    min: f64,
    max: f64,
}

impl ScaleLimits {
    /// Returns `None` for an empty, inverted or non-positive range.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min.is_finite() && max.is_finite() && min > 0.0 && min <= max)
            .then_some(Self { min, max })
    }

    /// Limits from a validated config.
    pub fn from_config(config: &TimelineConfig) -> Self {
        Self::new(config.min_scale, config.max_scale).unwrap_or_default()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamp a candidate scale. NaN maps to `min`.
    pub fn clamp(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            self.min
        } else {
            scale.clamp(self.min, self.max)
        }
    }
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 50.0,
        }
    }
}

/// Pan offset and zoom scale shared by the canvas and the label column.
///
/// Fields are private so `scale` can never leave its limits and offsets can
/// never become non-finite; mutation goes through the interaction
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
}

impl ViewportState {
    /// Unpanned, unzoomed view clamped into `limits`.
    pub fn identity(limits: &ScaleLimits) -> Self {
        Self::new(0.0, 0.0, 1.0, limits)
    }

    pub fn new(offset_x: f64, offset_y: f64, scale: f64, limits: &ScaleLimits) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            offset_x: finite_or_zero(offset_x),
            offset_y: finite_or_zero(offset_y),
            scale: limits.clamp(scale),
        }
    }

    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns whether the value changed.
    pub(crate) fn set_offset_x(&mut self, x: f64) -> bool {
        if !x.is_finite() || x == self.offset_x {
            return false;
        }
        self.offset_x = x;
        true
    }

    /// Returns whether the value changed.
    pub(crate) fn set_offset_y(&mut self, y: f64) -> bool {
        if !y.is_finite() || y == self.offset_y {
            return false;
        }
        self.offset_y = y;
        true
    }

    /// Multiply the scale by `factor`, keeping screen x `anchor_x` over the
    /// same world time. Returns whether the scale changed.
    pub(crate) fn zoom_at(&mut self, anchor_x: f64, factor: f64, limits: &ScaleLimits) -> bool {
        if !factor.is_finite() || factor <= 0.0 || !anchor_x.is_finite() {
            return false;
        }
        let old = self.scale;
        let new = limits.clamp(old * factor);
        if new == old {
            return false;
        }
        self.offset_x = anchor_x - (anchor_x - self.offset_x) * (new / old);
        self.scale = new;
        true
    }
}
