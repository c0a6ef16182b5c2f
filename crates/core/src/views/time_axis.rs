use chrono::{DateTime, FixedOffset, Offset, Utc};
use linescope_protocol::{Paint, Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::config::TimelineConfig;
use crate::mapper::Mapper;

const MAJOR_TICK_HEIGHT: f64 = 8.0;
const MINOR_TICK_HEIGHT: f64 = 3.0;
const LABEL_MIN_GAP: f64 = 60.0;
/// Hard cap on ticks per frame in case of pathological spans.
const MAX_TICKS: i64 = 4_000;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// One tick mark on the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTick {
    pub time_ms: f64,
    pub x: f64,
    pub major: bool,
}

/// Ticks for the visible window, plus the major interval they were built
/// from.
pub fn axis_ticks(mapper: &Mapper, config: &TimelineConfig) -> (Vec<AxisTick>, f64) {
    let visible = mapper.visible_time();
    let (major, subdivisions) = nice_interval(visible.span(), mapper.width(), config.major_tick_spacing);
    let minor = major / f64::from(subdivisions);
    let offset_ms = f64::from(config.utc_offset_minutes) * MINUTE;

    // Align on local wall-clock boundaries.
    let first = ((visible.min + offset_ms) / minor).floor() as i64;
    let last = ((visible.max + offset_ms) / minor).ceil() as i64;
    if last.saturating_sub(first) > MAX_TICKS {
        return (Vec::new(), major);
    }

    let subdivisions = i64::from(subdivisions);
    let ticks = (first..=last)
        .filter_map(|k| {
            let time_ms = k as f64 * minor - offset_ms;
            let x = mapper.to_screen_x(time_ms);
            (x >= 0.0 && x <= mapper.width()).then_some(AxisTick {
                time_ms,
                x,
                major: k.rem_euclid(subdivisions) == 0,
            })
        })
        .collect();
    (ticks, major)
}

/// Axis bar with ticks and wall-clock labels, pinned to the top of the
/// canvas.
pub fn render_time_axis(mapper: &Mapper, config: &TimelineConfig) -> Vec<RenderCommand> {
    let height = mapper.axis_height();
    if height <= 0.0 {
        return Vec::new();
    }
    let width = mapper.width();
    let (ticks, major) = axis_ticks(mapper, config);
    let mut commands = Vec::with_capacity(ticks.len() * 2 + 5);

    commands.push(RenderCommand::BeginGroup {
        id: "axis".into(),
        label: Some("Time axis".into()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, width, height),
        color: ThemeToken::AxisBackground.into(),
        border_color: None,
        record_id: None,
    });

    let mut last_label_x = f64::NEG_INFINITY;
    for tick in &ticks {
        let (tick_height, color, line_width) = if tick.major {
            (MAJOR_TICK_HEIGHT, ThemeToken::AxisTickMajor, 1.0)
        } else {
            (MINOR_TICK_HEIGHT, ThemeToken::AxisTickMinor, 0.5)
        };
        commands.push(RenderCommand::DrawLine {
            from: Point::new(tick.x, height - tick_height),
            to: Point::new(tick.x, height),
            color: color.into(),
            width: line_width,
        });

        if tick.major && tick.x - last_label_x >= LABEL_MIN_GAP && tick.x + 3.0 < width {
            commands.push(RenderCommand::DrawText {
                position: Point::new(tick.x + 3.0, (height - MAJOR_TICK_HEIGHT) / 2.0),
                text: SharedStr::from(format_label(tick.time_ms, major, config.utc_offset_minutes)),
                color: ThemeToken::AxisText.into(),
                font_size: config.axis_font_size,
                align: TextAlign::Left,
            });
            last_label_x = tick.x;
        }
    }

    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, height),
        to: Point::new(width, height),
        color: ThemeToken::AxisBorder.into(),
        width: 1.0,
    });
    commands.push(RenderCommand::EndGroup);
    commands
}

/// Vertical grid lines through the data area at major ticks.
pub fn render_grid(mapper: &Mapper, config: &TimelineConfig) -> Vec<RenderCommand> {
    let data = mapper.data_rect();
    if data.h <= 0.0 {
        return Vec::new();
    }
    let color: Paint = ThemeToken::GridLine.into();
    axis_ticks(mapper, config)
        .0
        .into_iter()
        .filter(|t| t.major)
        .map(|t| RenderCommand::DrawLine {
            from: Point::new(t.x, data.y),
            to: Point::new(t.x, data.bottom()),
            color,
            width: 0.5,
        })
        .collect()
}

/// Choose a major tick interval (ms) and its number of minor subdivisions so
/// major ticks land roughly `spacing_px` apart.
pub fn nice_interval(duration_ms: f64, width_px: f64, spacing_px: f64) -> (f64, u32) {
    let target_count = (width_px / spacing_px).max(2.0);
    let raw = duration_ms / target_count;

    let nice_values: &[(f64, u32)] = &[
        (1.0, 2),
        (2.0, 2),
        (5.0, 5),
        (10.0, 2),
        (20.0, 2),
        (50.0, 5),
        (100.0, 2),
        (200.0, 2),
        (500.0, 5),
        (SECOND, 2),
        (2.0 * SECOND, 2),
        (5.0 * SECOND, 5),
        (10.0 * SECOND, 2),
        (15.0 * SECOND, 3),
        (30.0 * SECOND, 3),
        (MINUTE, 2),
        (2.0 * MINUTE, 2),
        (5.0 * MINUTE, 5),
        (10.0 * MINUTE, 2),
        (15.0 * MINUTE, 3),
        (30.0 * MINUTE, 3),
        (HOUR, 2),
        (2.0 * HOUR, 2),
        (3.0 * HOUR, 3),
        (6.0 * HOUR, 2),
        (12.0 * HOUR, 2),
        (DAY, 2),
    ];

    for &(interval, subs) in nice_values {
        if interval >= raw {
            return (interval, subs);
        }
    }

    // Whole days beyond that.
    let days = (raw / DAY).ceil().max(1.0);
    (days * DAY, if days as u64 % 7 == 0 { 7 } else { 1 })
}

/// Wall-clock label for a tick, precise enough for the tick interval.
pub fn format_label(time_ms: f64, interval_ms: f64, utc_offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());
    let Some(utc) = DateTime::from_timestamp_millis(time_ms.round() as i64) else {
        return String::new();
    };
    let format = if interval_ms < SECOND {
        "%H:%M:%S%.3f"
    } else if interval_ms < MINUTE {
        "%H:%M:%S"
    } else if interval_ms < DAY {
        "%H:%M"
    } else {
        "%m-%d"
    };
    utc.with_timezone(&offset).format(format).to_string()
}
