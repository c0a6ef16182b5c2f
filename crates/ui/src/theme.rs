use egui::Color32;
use linescope_protocol::{Color, Paint, ThemeMode};

pub fn color32(color: Color) -> Color32 {
    let [r, g, b, a] = color.to_u8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn resolve(paint: impl Into<Paint>, mode: ThemeMode) -> Color32 {
    color32(paint.into().resolve(mode))
}

pub fn visuals(mode: ThemeMode) -> egui::Visuals {
    match mode {
        ThemeMode::Dark => egui::Visuals::dark(),
        ThemeMode::Light => egui::Visuals::light(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linescope_protocol::ThemeToken;

    #[test]
    fn keeps_alpha() {
        assert_eq!(color32(Color::from_u8(10, 20, 30, 128)).a(), 128);
        assert_eq!(
            color32(Color::from_u8(10, 20, 30, 255)),
            Color32::from_rgb(10, 20, 30)
        );
    }

    #[test]
    fn tokens_follow_mode() {
        let dark = resolve(ThemeToken::Background, ThemeMode::Dark);
        let light = resolve(ThemeToken::Background, ThemeMode::Light);
        assert_ne!(dark, light);
    }
}
