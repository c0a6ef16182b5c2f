use linescope_protocol::{Color, Paint, Point, Rect, RenderCommand, Stroke, ThemeToken};

use crate::model::Lane;
use crate::scene::{Glyph, TimelineScene};
use crate::views::time_axis::{render_grid, render_time_axis};

const GLOW_ALPHA: f32 = 0.35;
const GLYPH_STROKE_WIDTH: f64 = 1.0;
const HOVER_RING_GAP: f64 = 3.0;
const HOVER_RING_WIDTH: f64 = 2.0;

/// Render the full timeline frame.
///
/// Back-to-front: background, lane bands, separators, clipped record glyphs
/// per lane, grid lines, then the time axis pinned to the top. Lanes and
/// glyphs entirely off-canvas emit nothing.
pub fn render_timeline(scene: &TimelineScene<'_>) -> Vec<RenderCommand> {
    let m = &scene.mapper;
    let canvas = m.canvas_rect();
    let data = m.data_rect();
    let lanes = scene.visible_lanes();
    let mut commands = Vec::with_capacity(64 + lanes.len() * 8);

    commands.push(RenderCommand::Clear {
        color: ThemeToken::Background.into(),
    });

    for index in lanes.clone() {
        let Some(band) = m.lane_rect(index).intersection(&data) else {
            continue;
        };
        let token = if index % 2 == 0 {
            ThemeToken::LaneBandEven
        } else {
            ThemeToken::LaneBandOdd
        };
        commands.push(RenderCommand::DrawRect {
            rect: band,
            color: token.into(),
            border_color: None,
            record_id: None,
        });
    }

    let margin = m.lane_pitch() - m.lane_height();
    for index in lanes.clone() {
        let y = m.lane_top(index) + m.lane_height() + margin / 2.0;
        if y >= data.y && y <= data.bottom() {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(0.0, y),
                to: Point::new(canvas.w, y),
                color: ThemeToken::LaneSeparator.into(),
                width: 1.0,
            });
        }
    }

    if data.h > 0.0 {
        commands.push(RenderCommand::SetClip { rect: data });
        for index in lanes {
            if let Some(lane) = scene.layout.lane(index) {
                render_lane_glyphs(scene, lane, &data, &mut commands);
            }
        }
        commands.push(RenderCommand::ClearClip);
    }

    commands.extend(render_grid(m, scene.config));
    commands.extend(render_time_axis(m, scene.config));
    commands
}

fn render_lane_glyphs(
    scene: &TimelineScene<'_>,
    lane: &Lane,
    data: &Rect,
    out: &mut Vec<RenderCommand>,
) {
    let m = &scene.mapper;
    let glow_factor = scene.config.glow_factor;
    // Widen the window by the largest halo so glyphs straddling an edge stay.
    let margin_px = m.glyph_radius() * glow_factor.max(1.0);
    let t0 = m.to_world_time(-margin_px);
    let t1 = m.to_world_time(m.width() + margin_px);

    out.push(RenderCommand::BeginGroup {
        id: lane.key.clone(),
        label: Some(lane.title.clone()),
    });
    for &position in scene.records_in_window(lane, t0, t1) {
        let Some(glyph) = scene.glyph(lane, position) else {
            continue;
        };
        if !glyph.bounds(glow_factor).intersects(data) {
            continue;
        }
        emit_glyph(scene, &glyph, data, out);
    }
    out.push(RenderCommand::EndGroup);
}

/// Push `cmd` unless its own extent misses `data`.
fn push_visible(out: &mut Vec<RenderCommand>, data: &Rect, cmd: RenderCommand) {
    if cmd.bounds().is_none_or(|b| b.intersects(data)) {
        out.push(cmd);
    }
}

/// Emit the parts of one glyph. Each part is culled on its own: a bar that
/// reaches into view does not drag an off-canvas start circle along.
fn emit_glyph(scene: &TimelineScene<'_>, glyph: &Glyph, data: &Rect, out: &mut Vec<RenderCommand>) {
    let record_id = Some(glyph.record_id);

    if glyph.highlighted {
        let glow: Paint = match glyph.color {
            Paint::Rgba(c) => Color::with_alpha(c, c.a * GLOW_ALPHA).into(),
            Paint::Token(_) => ThemeToken::GlyphGlow.into(),
        };
        push_visible(
            out,
            data,
            RenderCommand::DrawCircle {
                center: glyph.center,
                radius: glyph.glow_radius(scene.config.glow_factor),
                fill: glow,
                stroke: None,
                record_id,
            },
        );
    }

    // Bars can be far wider than the canvas when zoomed in.
    if let Some(bar) = glyph.bar.and_then(|b| b.intersection(data)) {
        out.push(RenderCommand::DrawRect {
            rect: bar,
            color: glyph.color,
            border_color: None,
            record_id,
        });
    }

    push_visible(
        out,
        data,
        RenderCommand::DrawCircle {
            center: glyph.center,
            radius: glyph.radius,
            fill: glyph.color,
            stroke: Some(Stroke {
                color: ThemeToken::GlyphStroke.into(),
                width: GLYPH_STROKE_WIDTH,
            }),
            record_id,
        },
    );

    if scene.hovered == Some(glyph.record_id) {
        push_visible(
            out,
            data,
            RenderCommand::DrawCircle {
                center: glyph.center,
                radius: glyph.radius + HOVER_RING_GAP,
                fill: Color::rgba(0.0, 0.0, 0.0, 0.0).into(),
                stroke: Some(Stroke {
                    color: ThemeToken::HoverRing.into(),
                    width: HOVER_RING_WIDTH,
                }),
                record_id,
            },
        );
    }
}
