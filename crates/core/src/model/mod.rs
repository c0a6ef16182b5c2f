pub mod lane;
pub mod record;

pub use lane::Lane;
pub use record::{RecordId, RecordSet, TimelineRecord};
