use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    LaneBandEven,
    LaneBandOdd,
    LaneSeparator,

    GridLine,

    AxisBackground,
    AxisBorder,
    AxisTickMajor,
    AxisTickMinor,
    AxisText,

    GlyphDefault,
    GlyphStroke,
    GlyphGlow,
    HoverRing,

    LabelColumnBackground,
    LabelText,
    LabelTextMuted,

    /// Categorical palette slot for lanes without an explicit color.
    Series(u8),
}

/// Number of distinct `ThemeToken::Series` slots a theme must resolve.
pub const SERIES_COUNT: u8 = 8;

/// Fill or stroke paint: either a theme token or a concrete color carried by
/// the data (station colors, per-record colors).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Token(ThemeToken),
    Rgba(Color),
}

impl Paint {
    pub fn resolve(self, mode: ThemeMode) -> Color {
        match self {
            Paint::Token(token) => resolve(token, mode),
            Paint::Rgba(color) => color,
        }
    }
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Token(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Rgba(color)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

/// Resolve a token against the built-in palettes.
pub fn resolve(token: ThemeToken, mode: ThemeMode) -> Color {
    let [r, g, b, a] = match mode {
        ThemeMode::Dark => dark(token),
        ThemeMode::Light => light(token),
    };
    Color::from_u8(r, g, b, a)
}

const fn rgb(r: u8, g: u8, b: u8) -> [u8; 4] {
    [r, g, b, 255]
}

const fn rgba(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    [r, g, b, a]
}

// Tailwind slate, matching the dashboard the station colors come from.
const SERIES_DARK: [[u8; 4]; SERIES_COUNT as usize] = [
    rgb(0x81, 0x8c, 0xf8), // indigo-400
    rgb(0x34, 0xd3, 0x99), // emerald-400
    rgb(0xf4, 0x72, 0xb6), // pink-400
    rgb(0xfb, 0xbf, 0x24), // amber-400
    rgb(0xf8, 0x71, 0x71), // red-400
    rgb(0x22, 0xd3, 0xee), // cyan-400
    rgb(0xa7, 0x8b, 0xfa), // violet-400
    rgb(0xa3, 0xe6, 0x35), // lime-400
];

const SERIES_LIGHT: [[u8; 4]; SERIES_COUNT as usize] = [
    rgb(0x4f, 0x46, 0xe5), // indigo-600
    rgb(0x05, 0x96, 0x69), // emerald-600
    rgb(0xdb, 0x27, 0x77), // pink-600
    rgb(0xd9, 0x77, 0x06), // amber-600
    rgb(0xdc, 0x26, 0x26), // red-600
    rgb(0x08, 0x91, 0xb2), // cyan-600
    rgb(0x7c, 0x3a, 0xed), // violet-600
    rgb(0x65, 0xa3, 0x0d), // lime-600
];

fn dark(token: ThemeToken) -> [u8; 4] {
    use ThemeToken::*;
    match token {
        Background => rgb(0x0f, 0x17, 0x2a), // slate-900

        LaneBandEven => rgb(0x0f, 0x17, 0x2a),
        LaneBandOdd => rgb(0x13, 0x1c, 0x31),
        LaneSeparator => rgba(0x33, 0x41, 0x55, 160), // slate-700

        GridLine => rgba(0x47, 0x55, 0x69, 90), // slate-600

        AxisBackground => rgb(0x1e, 0x29, 0x3b), // slate-800
        AxisBorder => rgb(0x33, 0x41, 0x55),
        AxisTickMajor => rgb(0x94, 0xa3, 0xb8), // slate-400
        AxisTickMinor => rgb(0x47, 0x55, 0x69),
        AxisText => rgb(0xcb, 0xd5, 0xe1), // slate-300

        GlyphDefault => rgb(0x94, 0xa3, 0xb8),
        GlyphStroke => rgba(0x0f, 0x17, 0x2a, 200),
        GlyphGlow => rgba(0xf8, 0x71, 0x71, 90),
        HoverRing => rgb(0xf8, 0xfa, 0xfc), // slate-50

        LabelColumnBackground => rgb(0x1e, 0x29, 0x3b),
        LabelText => rgb(0xe2, 0xe8, 0xf0), // slate-200
        LabelTextMuted => rgb(0x94, 0xa3, 0xb8),

        Series(i) => SERIES_DARK[usize::from(i % SERIES_COUNT)],
    }
}

fn light(token: ThemeToken) -> [u8; 4] {
    use ThemeToken::*;
    match token {
        Background => rgb(0xff, 0xff, 0xff),

        LaneBandEven => rgb(0xff, 0xff, 0xff),
        LaneBandOdd => rgb(0xf8, 0xfa, 0xfc), // slate-50
        LaneSeparator => rgb(0xe2, 0xe8, 0xf0), // slate-200

        GridLine => rgba(0xcb, 0xd5, 0xe1, 140), // slate-300

        AxisBackground => rgb(0xf1, 0xf5, 0xf9), // slate-100
        AxisBorder => rgb(0xcb, 0xd5, 0xe1),
        AxisTickMajor => rgb(0x47, 0x55, 0x69), // slate-600
        AxisTickMinor => rgb(0xcb, 0xd5, 0xe1),
        AxisText => rgb(0x33, 0x41, 0x55), // slate-700

        GlyphDefault => rgb(0x64, 0x74, 0x8b), // slate-500
        GlyphStroke => rgba(0xff, 0xff, 0xff, 220),
        GlyphGlow => rgba(0xdc, 0x26, 0x26, 70),
        HoverRing => rgb(0x0f, 0x17, 0x2a),

        LabelColumnBackground => rgb(0xf1, 0xf5, 0xf9),
        LabelText => rgb(0x0f, 0x17, 0x2a),
        LabelTextMuted => rgb(0x64, 0x74, 0x8b),

        Series(i) => SERIES_LIGHT[usize::from(i % SERIES_COUNT)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_wraps() {
        for mode in [ThemeMode::Dark, ThemeMode::Light] {
            assert_eq!(
                resolve(ThemeToken::Series(SERIES_COUNT + 2), mode),
                resolve(ThemeToken::Series(2), mode)
            );
        }
    }

    #[test]
    fn concrete_paint_ignores_mode() {
        let c = Color::from_u8(1, 2, 3, 255);
        assert_eq!(Paint::Rgba(c).resolve(ThemeMode::Light), c);
        assert_eq!(Paint::Rgba(c).resolve(ThemeMode::Dark), c);
    }

    #[test]
    fn modes_differ_on_background() {
        assert_ne!(
            resolve(ThemeToken::Background, ThemeMode::Dark),
            resolve(ThemeToken::Background, ThemeMode::Light)
        );
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }
}
