use linescope_protocol::Point;
use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;
use crate::viewport::{ScaleLimits, ViewportState};

/// Modifier keys held during a wheel event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub fn zoom(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ZoomIn,
    ZoomOut,
    Reset,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Option<Self> {
        Some(match key {
            "+" | "=" => Key::ZoomIn,
            "-" | "_" => Key::ZoomOut,
            "0" => Key::Reset,
            "ArrowLeft" => Key::PanLeft,
            "ArrowRight" => Key::PanRight,
            "ArrowUp" => Key::PanUp,
            "ArrowDown" => Key::PanDown,
            _ => return None,
        })
    }
}

/// Host input in canvas-local CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { pos: Point },
    PointerMove { pos: Point },
    PointerUp { pos: Point },
    PointerLeave,
    Wheel {
        pos: Point,
        delta_x: f64,
        delta_y: f64,
        modifiers: Modifiers,
    },
    Key(Key),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    /// `anchor = pointer - offset` at pointer-down.
    Dragging { anchor: Point },
}

/// What an event changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportChange {
    pub horizontal: bool,
    pub vertical: bool,
    pub zoomed: bool,
}

impl ViewportChange {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical || self.zoomed
    }
}

/// Sizes the controller clamps vertical pan against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionBounds {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Axis plus all lane pitches.
    pub content_height: f64,
}

impl InteractionBounds {
    /// `offset_y` range that keeps content in view: `[min(0, view - content), 0]`.
    pub fn offset_y_range(&self) -> (f64, f64) {
        ((self.canvas_height - self.content_height).min(0.0), 0.0)
    }

    fn clamp_offset_y(&self, y: f64) -> f64 {
        let (lo, hi) = self.offset_y_range();
        y.clamp(lo, hi)
    }
}

/// The only writer of [`ViewportState`].
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    limits: ScaleLimits,
    zoom_sensitivity: f64,
    key_pan_step: f64,
    key_zoom_factor: f64,
    drag: DragState,
}

impl InteractionController {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            limits: ScaleLimits::from_config(config),
            zoom_sensitivity: config.zoom_sensitivity,
            key_pan_step: config.key_pan_step,
            key_zoom_factor: config.key_zoom_factor,
            drag: DragState::Idle,
        }
    }

    pub fn limits(&self) -> &ScaleLimits {
        &self.limits
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Apply one event to `viewport`.
    pub fn handle(
        &mut self,
        viewport: &mut ViewportState,
        event: &InputEvent,
        bounds: &InteractionBounds,
    ) -> ViewportChange {
        let mut change = ViewportChange::default();
        match *event {
            InputEvent::PointerDown { pos } => {
                if is_finite(pos) {
                    self.drag = DragState::Dragging {
                        anchor: Point::new(pos.x - viewport.offset_x(), pos.y - viewport.offset_y()),
                    };
                }
            }
            InputEvent::PointerMove { pos } => {
                if let DragState::Dragging { anchor } = self.drag {
                    change.horizontal = viewport.set_offset_x(pos.x - anchor.x);
                    change.vertical = viewport.set_offset_y(bounds.clamp_offset_y(pos.y - anchor.y));
                }
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
                self.drag = DragState::Idle;
            }
            InputEvent::Wheel {
                pos,
                delta_x,
                delta_y,
                modifiers,
            } => {
                if modifiers.zoom() {
                    // No single step needs more than the full min..max ratio.
                    let reach = (self.limits.max() / self.limits.min()).ln();
                    let factor = (-delta_y * self.zoom_sensitivity).clamp(-reach, reach).exp();
                    change.zoomed = viewport.zoom_at(pos.x, factor, &self.limits);
                    change.horizontal = change.zoomed;
                    if change.zoomed && self.is_dragging() && is_finite(pos) {
                        self.drag = DragState::Dragging {
                            anchor: Point::new(pos.x - viewport.offset_x(), pos.y - viewport.offset_y()),
                        };
                    }
                } else if modifiers.shift {
                    let y = bounds.clamp_offset_y(viewport.offset_y() - delta_y);
                    change.vertical = viewport.set_offset_y(y);
                } else {
                    let delta = if delta_x != 0.0 { delta_x } else { delta_y };
                    change.horizontal = viewport.set_offset_x(viewport.offset_x() - delta);
                }
            }
            InputEvent::Key(key) => change = self.handle_key(viewport, key, bounds),
        }
        if change.any() {
            log::trace!(
                "viewport offset=({:.1}, {:.1}) scale={:.3}",
                viewport.offset_x(),
                viewport.offset_y(),
                viewport.scale()
            );
        }
        change
    }

    fn handle_key(
        &self,
        viewport: &mut ViewportState,
        key: Key,
        bounds: &InteractionBounds,
    ) -> ViewportChange {
        let mut change = ViewportChange::default();
        let center_x = bounds.canvas_width / 2.0;
        let step = self.key_pan_step;
        match key {
            Key::ZoomIn | Key::ZoomOut => {
                let factor = if key == Key::ZoomIn {
                    self.key_zoom_factor
                } else {
                    1.0 / self.key_zoom_factor
                };
                change.zoomed = viewport.zoom_at(center_x, factor, &self.limits);
                change.horizontal = change.zoomed;
            }
            Key::Reset => {
                let before = *viewport;
                *viewport = ViewportState::identity(&self.limits);
                change = diff(&before, viewport);
            }
            Key::PanLeft => change.horizontal = viewport.set_offset_x(viewport.offset_x() + step),
            Key::PanRight => change.horizontal = viewport.set_offset_x(viewport.offset_x() - step),
            Key::PanUp => {
                let y = bounds.clamp_offset_y(viewport.offset_y() + step);
                change.vertical = viewport.set_offset_y(y);
            }
            Key::PanDown => {
                let y = bounds.clamp_offset_y(viewport.offset_y() - step);
                change.vertical = viewport.set_offset_y(y);
            }
        }
        change
    }

    /// Re-clamp after the content or canvas height changed.
    pub fn clamp_vertical(&self, viewport: &mut ViewportState, bounds: &InteractionBounds) -> bool {
        viewport.set_offset_y(bounds.clamp_offset_y(viewport.offset_y()))
    }

    /// Replace the viewport with `target`, clamped. Used by fit-to-view.
    pub fn jump_to(
        &mut self,
        viewport: &mut ViewportState,
        target: ViewportState,
        bounds: &InteractionBounds,
    ) -> ViewportChange {
        self.drag = DragState::Idle;
        let before = *viewport;
        *viewport = ViewportState::new(
            target.offset_x(),
            bounds.clamp_offset_y(target.offset_y()),
            target.scale(),
            &self.limits,
        );
        diff(&before, viewport)
    }
}

fn diff(before: &ViewportState, after: &ViewportState) -> ViewportChange {
    ViewportChange {
        horizontal: after.offset_x() != before.offset_x(),
        vertical: after.offset_y() != before.offset_y(),
        zoomed: after.scale() != before.scale(),
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
