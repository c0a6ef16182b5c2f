use std::f64::consts::TAU;

use linescope_core::TimelineError;
use linescope_protocol::{Frame, Paint, RenderCommand, SurfaceSize, TextAlign, ThemeMode};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Replays display lists onto a `<canvas>` through its 2D context.
///
/// The painter is the only owner of the context. Commands arrive in CSS
/// pixels; a single `dpr` transform is applied per frame and the backing
/// store is resized to the frame's physical size when it changes.
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn attach(canvas_id: &str) -> Result<Self, TimelineError> {
        let unavailable = |why: &str| TimelineError::CanvasUnavailable(format!("#{canvas_id}: {why}"));
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| unavailable("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| unavailable("no such element"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| unavailable("not a canvas"))?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| unavailable(&js_message(&e)))?
            .ok_or_else(|| unavailable("2d context refused"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| unavailable("unexpected context type"))?;
        Ok(Self { canvas, ctx })
    }

    pub fn paint(&self, frame: &Frame, mode: ThemeMode) -> Result<(), JsValue> {
        self.fit_backing_store(&frame.surface)?;
        let dpr = frame.surface.dpr;
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;

        let css = |paint: &Paint| paint.resolve(mode).to_css();
        let mut clip_depth = 0usize;

        for command in &frame.commands {
            match command {
                RenderCommand::Clear { color } => {
                    let r = frame.surface.css_rect();
                    self.ctx.clear_rect(r.x, r.y, r.w, r.h);
                    self.ctx.set_fill_style_str(&css(color));
                    self.ctx.fill_rect(r.x, r.y, r.w, r.h);
                }
                RenderCommand::DrawRect {
                    rect,
                    color,
                    border_color,
                    ..
                } => {
                    self.ctx.set_fill_style_str(&css(color));
                    self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
                    if let Some(border) = border_color {
                        self.ctx.set_stroke_style_str(&css(border));
                        self.ctx.set_line_width(1.0);
                        self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
                    }
                }
                RenderCommand::DrawCircle {
                    center,
                    radius,
                    fill,
                    stroke,
                    ..
                } => {
                    self.ctx.begin_path();
                    self.ctx.arc(center.x, center.y, *radius, 0.0, TAU)?;
                    self.ctx.set_fill_style_str(&css(fill));
                    self.ctx.fill();
                    if let Some(stroke) = stroke {
                        self.ctx.set_stroke_style_str(&css(&stroke.color));
                        self.ctx.set_line_width(stroke.width);
                        self.ctx.stroke();
                    }
                }
                RenderCommand::DrawText {
                    position,
                    text,
                    color,
                    font_size,
                    align,
                } => {
                    self.ctx.set_font(&format!("{font_size}px system-ui, sans-serif"));
                    self.ctx.set_text_align(match align {
                        TextAlign::Left => "left",
                        TextAlign::Center => "center",
                        TextAlign::Right => "right",
                    });
                    self.ctx.set_text_baseline("middle");
                    self.ctx.set_fill_style_str(&css(color));
                    self.ctx.fill_text(text, position.x, position.y)?;
                }
                RenderCommand::DrawLine {
                    from,
                    to,
                    color,
                    width,
                } => {
                    self.ctx.begin_path();
                    self.ctx.move_to(from.x, from.y);
                    self.ctx.line_to(to.x, to.y);
                    self.ctx.set_stroke_style_str(&css(color));
                    self.ctx.set_line_width(*width);
                    self.ctx.stroke();
                }
                RenderCommand::SetClip { rect } => {
                    self.ctx.save();
                    self.ctx.begin_path();
                    self.ctx.rect(rect.x, rect.y, rect.w, rect.h);
                    self.ctx.clip();
                    clip_depth += 1;
                }
                RenderCommand::ClearClip => {
                    if clip_depth > 0 {
                        self.ctx.restore();
                        clip_depth -= 1;
                    }
                }
                // Groups carry no drawing state on a 2D context.
                RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
            }
        }

        for _ in 0..clip_depth {
            self.ctx.restore();
        }
        Ok(())
    }

    fn fit_backing_store(&self, size: &SurfaceSize) -> Result<(), JsValue> {
        if self.canvas.width() != size.backing_width {
            self.canvas.set_width(size.backing_width);
        }
        if self.canvas.height() != size.backing_height {
            self.canvas.set_height(size.backing_height);
        }
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", size.css_width))?;
        style.set_property("height", &format!("{}px", size.css_height))?;
        Ok(())
    }
}

pub fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
