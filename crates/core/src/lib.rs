//! Multi-lane timeline: record validation, filtering, lane layout,
//! coordinate mapping, display-list rendering, hit-testing and
//! pan/zoom interaction.
//!
//! Everything here is backend-agnostic. [`Timeline::render`] produces a
//! [`linescope_protocol::Frame`] that a Canvas2D or egui backend replays.

pub mod config;
pub mod error;
pub mod filter;
pub mod hit_test;
pub mod interaction;
pub mod label_column;
pub mod layout;
pub mod mapper;
pub mod model;
pub mod scene;
pub mod surface;
pub mod time_range;
pub mod timeline;
pub mod viewport;
pub mod views;

pub use config::TimelineConfig;
pub use error::{Result, TimelineError};
pub use filter::{FacetCount, Facets, FilterLayer, FilterSelection};
pub use hit_test::{Hit, hit_test};
pub use interaction::{
    DragState, InputEvent, InteractionBounds, InteractionController, Key, Modifiers, ViewportChange,
};
pub use label_column::{LabelColumn, LabelRow};
pub use layout::{LaneGrouping, LaneKeyKind, LaneLayout, LaneOrder};
pub use mapper::Mapper;
pub use model::{Lane, RecordId, RecordSet, TimelineRecord};
pub use scene::{Glyph, TimelineScene};
pub use surface::CanvasSurface;
pub use time_range::TimeRange;
pub use timeline::{HoverInfo, Timeline};
pub use viewport::{ScaleLimits, ViewportState};
