pub mod commands;
pub mod record;
pub mod shared_str;
pub mod station;
pub mod theme;
pub mod types;

pub use commands::{Frame, RenderCommand, Stroke, TextAlign};
pub use record::RecordInput;
pub use shared_str::SharedStr;
pub use station::{StationCatalog, StationInfo};
pub use theme::{Paint, SERIES_COUNT, ThemeMode, ThemeToken};
pub use types::{Color, Point, Rect, SurfaceSize};
