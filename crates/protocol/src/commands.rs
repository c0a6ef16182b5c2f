use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::Paint;
use crate::types::{Point, Rect, SurfaceSize};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` per frame, already in back-to-front
/// order. Renderers consume the list sequentially; each command carries all
/// the data it needs. Coordinates are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole surface.
    Clear { color: Paint },

    /// Draw a filled rectangle. `record_id` marks record glyphs.
    DrawRect {
        rect: Rect,
        color: Paint,
        border_color: Option<Paint>,
        record_id: Option<u64>,
    },

    /// Draw a filled circle, optionally outlined.
    DrawCircle {
        center: Point,
        radius: f64,
        fill: Paint,
        stroke: Option<Stroke>,
        record_id: Option<u64>,
    },

    /// Draw a text string anchored vertically centered at `position`.
    DrawText {
        position: Point,
        text: SharedStr,
        color: Paint,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: Paint,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group (a lane, the axis). Renderers may use this for
    /// batching or accessibility.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Paint,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl RenderCommand {
    /// Geometric bounds of a drawing command, if it has any.
    ///
    /// Text bounds only cover the anchor point; glyph extents are a backend
    /// concern.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            RenderCommand::DrawRect { rect, .. } => Some(*rect),
            RenderCommand::DrawCircle {
                center,
                radius,
                stroke,
                ..
            } => {
                let r = radius + stroke.map_or(0.0, |s| s.width / 2.0);
                Some(Rect::new(center.x - r, center.y - r, 2.0 * r, 2.0 * r))
            }
            RenderCommand::DrawLine { from, to, .. } => Some(Rect::new(
                from.x.min(to.x),
                from.y.min(to.y),
                (from.x - to.x).abs(),
                (from.y - to.y).abs(),
            )),
            RenderCommand::DrawText { position, .. } => {
                Some(Rect::new(position.x, position.y, 0.0, 0.0))
            }
            _ => None,
        }
    }

    /// The record a glyph command belongs to.
    pub fn record_id(&self) -> Option<u64> {
        match self {
            RenderCommand::DrawRect { record_id, .. }
            | RenderCommand::DrawCircle { record_id, .. } => *record_id,
            _ => None,
        }
    }
}

/// One rendered frame: the surface it was laid out for plus its commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub surface: SurfaceSize,
    pub commands: Vec<RenderCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeToken;

    #[test]
    fn circle_bounds_include_stroke() {
        let cmd = RenderCommand::DrawCircle {
            center: Point::new(10.0, 10.0),
            radius: 4.0,
            fill: ThemeToken::GlyphDefault.into(),
            stroke: Some(Stroke {
                color: ThemeToken::GlyphStroke.into(),
                width: 2.0,
            }),
            record_id: Some(7),
        };
        assert_eq!(cmd.bounds(), Some(Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(cmd.record_id(), Some(7));
    }

    #[test]
    fn groups_have_no_bounds() {
        assert!(RenderCommand::EndGroup.bounds().is_none());
        assert!(RenderCommand::ClearClip.record_id().is_none());
    }

    #[test]
    fn display_list_serializes() {
        let cmds = vec![
            RenderCommand::Clear {
                color: ThemeToken::Background.into(),
            },
            RenderCommand::DrawText {
                position: Point::new(1.0, 2.0),
                text: "09:45:18".into(),
                color: ThemeToken::AxisText.into(),
                font_size: 10.0,
                align: TextAlign::Left,
            },
        ];
        let json = serde_json::to_string(&cmds).unwrap_or_default();
        assert!(json.contains("\"Clear\""));
        assert!(json.contains("09:45:18"));
        let back: Vec<RenderCommand> = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(back, cmds);
    }
}
