use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Stroke, StrokeKind, Vec2};
use linescope_protocol::{Frame, RenderCommand, TextAlign, ThemeMode};

use crate::theme;

/// Replay a frame into an egui `Painter`.
///
/// `origin` is the screen position of the frame's (0, 0). egui works in
/// points, which already account for the display scale, so CSS pixels map
/// 1:1 and the frame's `dpr` is not applied again here.
pub fn render_frame(painter: &mut egui::Painter, frame: &Frame, origin: Pos2, mode: ThemeMode) {
    let to_screen = |x: f64, y: f64| origin + Vec2::new(x as f32, y as f32);
    let to_rect = |r: &linescope_protocol::Rect| {
        Rect::from_min_size(to_screen(r.x, r.y), Vec2::new(r.w as f32, r.h as f32))
    };
    let mut clip_stack: Vec<Rect> = Vec::new();

    for cmd in &frame.commands {
        match cmd {
            RenderCommand::Clear { color } => {
                let area = to_rect(&frame.surface.css_rect());
                painter.rect_filled(area, CornerRadius::ZERO, theme::resolve(*color, mode));
            }

            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                ..
            } => {
                let r = to_rect(rect);
                if !painter.clip_rect().intersects(r) {
                    continue;
                }
                painter.rect_filled(r, CornerRadius::ZERO, theme::resolve(*color, mode));
                if let Some(border) = border_color {
                    painter.rect_stroke(
                        r,
                        CornerRadius::ZERO,
                        Stroke::new(1.0, theme::resolve(*border, mode)),
                        StrokeKind::Inside,
                    );
                }
            }

            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                stroke,
                ..
            } => {
                let stroke = stroke.map_or(Stroke::NONE, |s| {
                    Stroke::new(s.width as f32, theme::resolve(s.color, mode))
                });
                painter.circle(
                    to_screen(center.x, center.y),
                    *radius as f32,
                    theme::resolve(*fill, mode),
                    stroke,
                );
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_CENTER,
                    TextAlign::Center => Align2::CENTER_CENTER,
                    TextAlign::Right => Align2::RIGHT_CENTER,
                };
                painter.text(
                    to_screen(position.x, position.y),
                    anchor,
                    text.as_ref(),
                    FontId::proportional(*font_size as f32),
                    theme::resolve(*color, mode),
                );
            }

            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => {
                painter.line_segment(
                    [to_screen(from.x, from.y), to_screen(to.x, to.y)],
                    Stroke::new(*width as f32, theme::resolve(*color, mode)),
                );
            }

            RenderCommand::SetClip { rect } => {
                clip_stack.push(painter.clip_rect());
                painter.set_clip_rect(painter.clip_rect().intersect(to_rect(rect)));
            }

            RenderCommand::ClearClip => {
                if let Some(prev) = clip_stack.pop() {
                    painter.set_clip_rect(prev);
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }

    if let Some(outer) = clip_stack.into_iter().next() {
        painter.set_clip_rect(outer);
    }
}
