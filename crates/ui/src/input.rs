use egui::Vec2;
use linescope_core::{InputEvent, Key, Modifiers};
use linescope_protocol::Point;

pub fn map_key(key: egui::Key) -> Option<Key> {
    use egui::Key as K;
    Some(match key {
        K::Plus | K::Equals => Key::ZoomIn,
        K::Minus => Key::ZoomOut,
        K::Num0 => Key::Reset,
        K::ArrowLeft => Key::PanLeft,
        K::ArrowRight => Key::PanRight,
        K::ArrowUp => Key::PanUp,
        K::ArrowDown => Key::PanDown,
        _ => return None,
    })
}

pub fn map_modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        ctrl: m.ctrl,
        meta: m.mac_cmd,
        alt: m.alt,
    }
}

/// Translate one frame of egui scroll and pinch input into a wheel event.
///
/// egui scroll deltas point the way content moves, the opposite of DOM
/// `deltaX`/`deltaY`. egui also folds ctrl+wheel into `zoom` and shift+wheel
/// into horizontal scroll, so both are unfolded back into wheel deltas.
pub fn wheel_event(
    pos: Point,
    scroll: Vec2,
    zoom: f32,
    modifiers: egui::Modifiers,
    zoom_sensitivity: f64,
) -> Option<InputEvent> {
    let modifiers = map_modifiers(modifiers);

    if (zoom - 1.0).abs() > f32::EPSILON && zoom > 0.0 && zoom_sensitivity > 0.0 {
        // exp(-delta_y * sensitivity) == zoom
        let delta_y = -f64::from(zoom).ln() / zoom_sensitivity;
        return Some(InputEvent::Wheel {
            pos,
            delta_x: 0.0,
            delta_y,
            modifiers: Modifiers {
                ctrl: true,
                ..modifiers
            },
        });
    }

    if scroll == Vec2::ZERO {
        return None;
    }
    let (delta_x, delta_y) = if modifiers.shift && scroll.y == 0.0 {
        (0.0, -f64::from(scroll.x))
    } else {
        (-f64::from(scroll.x), -f64::from(scroll.y))
    };
    Some(InputEvent::Wheel {
        pos,
        delta_x,
        delta_y,
        modifiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSITIVITY: f64 = 0.0015;

    #[test]
    fn keys() {
        assert_eq!(map_key(egui::Key::Equals), Some(Key::ZoomIn));
        assert_eq!(map_key(egui::Key::Num0), Some(Key::Reset));
        assert_eq!(map_key(egui::Key::A), None);
    }

    #[test]
    fn scroll_is_inverted_into_wheel_deltas() {
        let ev = wheel_event(
            Point::new(5.0, 6.0),
            Vec2::new(0.0, 30.0),
            1.0,
            egui::Modifiers::NONE,
            SENSITIVITY,
        );
        match ev {
            Some(InputEvent::Wheel {
                delta_x, delta_y, ..
            }) => {
                assert!(delta_x.abs() < f64::EPSILON);
                assert!((delta_y + 30.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shift_scroll_becomes_vertical_pan() {
        let ev = wheel_event(
            Point::new(0.0, 0.0),
            Vec2::new(-12.0, 0.0),
            1.0,
            egui::Modifiers::SHIFT,
            SENSITIVITY,
        );
        match ev {
            Some(InputEvent::Wheel {
                delta_y, modifiers, ..
            }) => {
                assert!(modifiers.shift);
                assert!((delta_y - 12.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pinch_becomes_ctrl_wheel_with_matching_factor() {
        let ev = wheel_event(
            Point::new(0.0, 0.0),
            Vec2::ZERO,
            1.5,
            egui::Modifiers::NONE,
            SENSITIVITY,
        );
        match ev {
            Some(InputEvent::Wheel {
                delta_y, modifiers, ..
            }) => {
                assert!(modifiers.zoom());
                assert!(((-delta_y * SENSITIVITY).exp() - 1.5).abs() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn idle_input_produces_nothing() {
        assert!(
            wheel_event(
                Point::new(0.0, 0.0),
                Vec2::ZERO,
                1.0,
                egui::Modifiers::NONE,
                SENSITIVITY
            )
            .is_none()
        );
    }
}
